pub mod health;
pub mod products;

pub use health::HealthResponse;
pub use products::{PaginationQuery, ProductResponse};
