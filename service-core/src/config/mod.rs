use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Settings shared by every tier: where to listen.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Config {
    /// Loads `APP__PORT` / `APP__HOST` (plus an optional `configuration` file).
    /// A missing port is a startup fault.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads `key` from the environment, falling back to `default` when given.
pub fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    resolve(key, default, |k| env::var(k).ok())
}

/// Reads and parses `key`, falling back to `default` when unset.
pub fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_with(key, default, |k| env::var(k).ok())
}

fn resolve(
    key: &str,
    default: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, AppError> {
    match lookup(key) {
        Some(val) if !val.trim().is_empty() => Ok(val),
        _ => default.map(str::to_string).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("{} is required but not set", key))
        }),
    }
}

fn parse_with<T>(
    key: &str,
    default: T,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e))
        }),
        _ => Ok(default),
    }
}
