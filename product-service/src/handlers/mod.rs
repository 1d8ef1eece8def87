pub mod health;
pub mod metrics;
pub mod products;

pub use health::health_check;
pub use metrics::metrics_endpoint;
pub use products::{create_product, list_products};

use service_core::error::AppError;

pub async fn not_found() -> AppError {
    AppError::NotFound
}
