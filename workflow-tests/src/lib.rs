//! Cross-tier workflow test infrastructure.
//!
//! [`Stack::spawn`] starts a product service over the in-memory store and a
//! gateway pointed at it, both in-process on random ports. Tests talk to the
//! gateway only, the way a browser would.
//!
//! Against a deployed stack instead, set `GATEWAY_URL` and run the ignored
//! tests:
//!
//! ```bash
//! GATEWAY_URL=http://localhost:8080 cargo test -p workflow-tests -- --ignored
//! ```

use anyhow::{anyhow, Result};
use api_gateway::config::{GatewayConfig, UpstreamSettings};
use product_service::config::{HealthMode, ProductConfig, StoreBackend, StoreConfig};
use product_service::services::{
    ConnectionMonitor, ConnectionPhase, HealthAggregator, InMemoryProductStore, ProductStore,
};
use product_service::startup::{AppState, Application as ProductApplication};
use service_core::config::Config as CoreConfig;
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,workflow_tests=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn local(port: u16) -> CoreConfig {
    CoreConfig {
        port,
        host: "127.0.0.1".to_string(),
    }
}

/// Both tiers running in-process.
pub struct Stack {
    pub gateway_url: String,
    pub product_url: String,
    /// Drives the product service's store phase, standing in for the driver.
    pub connection: Arc<ConnectionMonitor>,
    client: reqwest::Client,
}

impl Stack {
    /// Strict health, store connected.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(HealthMode::Strict, ConnectionPhase::Connected).await
    }

    pub async fn spawn_with(health_mode: HealthMode, phase: ConnectionPhase) -> Result<Self> {
        init_tracing();

        let connection = Arc::new(ConnectionMonitor::new());
        connection.set(phase);
        let store: Arc<dyn ProductStore> = Arc::new(InMemoryProductStore::new());
        let health = HealthAggregator::new(connection.clone(), health_mode);
        let state = AppState::new(store, connection.clone(), health);

        let product_config = ProductConfig {
            common: local(0),
            store: StoreConfig {
                backend: StoreBackend::Memory,
                mongodb: None,
            },
            health_mode,
        };
        let product = ProductApplication::with_state(&product_config, state)
            .await
            .map_err(|e| anyhow!("Failed to start product-service: {}", e))?;
        let product_url = format!("http://127.0.0.1:{}", product.port());
        tokio::spawn(async move {
            product.run_until_stopped().await.ok();
        });

        let gateway_config = GatewayConfig {
            common: local(0),
            upstream: UpstreamSettings {
                url: product_url.clone(),
                api_prefix: "/api".to_string(),
                timeout_secs: 5,
                max_body_bytes: 10 * 1024 * 1024,
            },
        };
        let gateway = api_gateway::startup::Application::build(gateway_config)
            .await
            .map_err(|e| anyhow!("Failed to start api-gateway: {}", e))?;
        let gateway_url = format!("http://127.0.0.1:{}", gateway.port());
        tokio::spawn(async move {
            gateway.run_until_stopped().await.ok();
        });

        tracing::debug!(%gateway_url, %product_url, "Stack started");

        Ok(Self {
            gateway_url,
            product_url,
            connection,
            client: reqwest::Client::new(),
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn gateway(&self, path: &str) -> String {
        format!("{}{}", self.gateway_url, path)
    }
}

/// Gateway address of a deployed stack, from `GATEWAY_URL`.
pub fn deployed_gateway_url() -> String {
    std::env::var("GATEWAY_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Polls `{gateway}/health` and then `{gateway}/api/health` until both answer
/// 200 or `timeout` passes.
pub async fn wait_for_stack(gateway_url: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::new();
    let start = std::time::Instant::now();

    for path in ["/health", "/api/health"] {
        let url = format!("{}{}", gateway_url, path);
        loop {
            match client.get(&url).timeout(Duration::from_secs(2)).send().await {
                Ok(resp) if resp.status().is_success() => break,
                Ok(resp) => tracing::debug!("{} answered {}", url, resp.status()),
                Err(e) => tracing::debug!("{} unreachable: {}", url, e),
            }

            if start.elapsed() > timeout {
                return Err(anyhow!("Timeout waiting for {}", url));
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    tracing::info!("Stack is healthy");
    Ok(())
}
