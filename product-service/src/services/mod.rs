pub mod connection;
pub mod database;
pub mod health;
pub mod memory;
pub mod store;

pub use connection::{ConnectionMonitor, ConnectionPhase};
pub use database::{MongoDb, MongoProductStore};
pub use health::{HealthAggregator, HealthState};
pub use memory::InMemoryProductStore;
pub use store::{ProductStore, ProductStream, StoreError};
