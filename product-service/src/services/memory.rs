use super::store::{ProductStore, ProductStream, StoreError};
use crate::models::{NewProduct, Product};
use crate::validation::Pagination;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Process-local product store, selected with `STORE_BACKEND=memory`.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<Product>>,
    unavailable: AtomicBool,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with [`StoreError::Unavailable`] until reset,
    /// mimicking an unreachable database.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.products.read().map(|p| p.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        self.check_available()?;

        let mut products = self.products.write().map_err(|_| StoreError::Unavailable)?;
        let product = product.into_product(Product::timestamp_now());
        products.push(product.clone());

        Ok(product)
    }

    async fn list(&self, page: Pagination) -> Result<ProductStream, StoreError> {
        self.check_available()?;

        let products = self.products.read().map_err(|_| StoreError::Unavailable)?;
        // Newest insert first, so equal timestamps still list in reverse creation order.
        let mut snapshot: Vec<Product> = products.iter().rev().cloned().collect();
        snapshot.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page: Vec<Product> = snapshot
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .collect();

        Ok(stream::iter(page.into_iter().map(Ok)).boxed())
    }
}
