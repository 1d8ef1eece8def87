use serde::Deserialize;
use service_core::config::{self as core_config, get_env, parse_env};
use service_core::error::AppError;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub upstream: UpstreamSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSettings {
    /// Base URL of the product service (e.g. http://product-service:8080).
    pub url: String,
    /// Path prefix forwarded as-is; everything else is answered locally.
    pub api_prefix: String,
    pub timeout_secs: u64,
    /// Connection-level cap on a buffered request body.
    pub max_body_bytes: usize,
}

impl UpstreamSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env and the APP__ prefix
        let common = core_config::Config::load()?;

        let upstream = UpstreamSettings {
            url: normalize_url(&get_env("UPSTREAM_URL", None)?)?,
            api_prefix: normalize_prefix(&get_env("API_PREFIX", Some("/api"))?)?,
            timeout_secs: parse_env("UPSTREAM_TIMEOUT_SECS", 30)?,
            max_body_bytes: parse_env("MAX_FORWARD_BODY_BYTES", 10 * 1024 * 1024)?,
        };

        Ok(GatewayConfig { common, upstream })
    }
}

fn normalize_url(raw: &str) -> Result<String, AppError> {
    let url = reqwest::Url::parse(raw.trim()).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("UPSTREAM_URL '{}' is not a valid URL: {}", raw, e))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "UPSTREAM_URL must be http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// `api`, `/api/` and `/api` all become `/api`.
fn normalize_prefix(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "API_PREFIX must name a path segment"
        )));
    }
    Ok(format!("/{}", trimmed))
}
