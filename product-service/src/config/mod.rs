use serde::Deserialize;
use service_core::config::{self as core_config, get_env, parse_env};
use service_core::error::AppError;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub health_mode: HealthMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb: Option<MongoConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_secs(self.server_selection_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

/// How `/api/health` reduces the store's connection phase.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthMode {
    /// Always `ok: true` with 200, whatever the store is doing.
    Optimistic,
    /// `ok` only while the store is connected; 503 otherwise.
    Strict,
}

impl ProductConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env and the APP__ prefix
        let common = core_config::Config::load()?;

        let backend: StoreBackend = parse_env("STORE_BACKEND", StoreBackend::MongoDb)?;
        let mongodb = match backend {
            StoreBackend::MongoDb => Some(MongoConfig {
                uri: get_env("MONGODB_URI", None)?,
                database: get_env("MONGODB_DATABASE", Some("products"))?,
                server_selection_timeout_secs: parse_env(
                    "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                    5,
                )?,
            }),
            StoreBackend::Memory => None,
        };

        Ok(ProductConfig {
            common,
            store: StoreConfig { backend, mongodb },
            health_mode: parse_env("HEALTH_MODE", HealthMode::Strict)?,
        })
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl std::str::FromStr for HealthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "optimistic" => Ok(HealthMode::Optimistic),
            "strict" => Ok(HealthMode::Strict),
            _ => Err(format!("Invalid health mode: {}", s)),
        }
    }
}
