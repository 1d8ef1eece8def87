use crate::models::{NewProduct, Product};
use crate::validation::Pagination;
use async_trait::async_trait;
use futures::stream::BoxStream;
use service_core::error::AppError;
use thiserror::Error;

/// Products in listing order. Finite; call `list` again to restart.
pub type ProductStream = BoxStream<'static, Result<Product, StoreError>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable")]
    Unavailable,

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StorageFault(anyhow::Error::new(err))
    }
}

/// Persistence boundary for products.
///
/// Implementations never change the connection phase; they only use the
/// connection they were handed.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persists a validated product, assigning its id and creation time.
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Newest first, skipping `page.skip` and yielding at most `page.limit`.
    async fn list(&self, page: Pagination) -> Result<ProductStream, StoreError>;
}
