pub mod health;
pub mod metrics;
pub mod proxy;

pub use health::health_check;
pub use metrics::metrics;
pub use proxy::forward;

use service_core::error::AppError;

pub async fn not_found() -> AppError {
    AppError::NotFound
}
