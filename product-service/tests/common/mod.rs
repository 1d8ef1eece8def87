#![allow(dead_code)]

use axum::Router;
use product_service::config::{HealthMode, ProductConfig, StoreBackend, StoreConfig};
use product_service::services::{
    ConnectionMonitor, ConnectionPhase, HealthAggregator, InMemoryProductStore, ProductStore,
};
use product_service::startup::{build_router, AppState, Application};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub fn test_config(health_mode: HealthMode) -> ProductConfig {
    ProductConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            host: "127.0.0.1".to_string(),
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            mongodb: None,
        },
        health_mode,
    }
}

/// State over a fresh in-memory store whose connection reports `Connected`.
pub fn test_state(health_mode: HealthMode) -> (AppState, Arc<InMemoryProductStore>) {
    let store = Arc::new(InMemoryProductStore::new());
    let connection = Arc::new(ConnectionMonitor::new());
    connection.set(ConnectionPhase::Connected);

    let health = HealthAggregator::new(connection.clone(), health_mode);
    let dyn_store: Arc<dyn ProductStore> = store.clone();

    (AppState::new(dyn_store, connection, health), store)
}

/// Router for `oneshot` tests, no listener.
pub fn test_router(health_mode: HealthMode) -> (Router, AppState, Arc<InMemoryProductStore>) {
    let (state, store) = test_state(health_mode);
    (build_router(state.clone()), state, store)
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemoryProductStore>,
    pub connection: Arc<ConnectionMonitor>,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_mode(HealthMode::Strict).await
    }

    pub async fn spawn_with_mode(health_mode: HealthMode) -> Self {
        let (state, store) = test_state(health_mode);
        let connection = state.connection.clone();

        let app = Application::with_state(&test_config(health_mode), state)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(app.run_until(async move {
            let _ = rx.await;
        }));

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
            store,
            connection,
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub async fn create_product(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/products", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn list_products(&self, query: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/api/products{}", self.address, query))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn health(&self) -> reqwest::Response {
        self.client
            .get(format!("{}/api/health", self.address))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Sends the shutdown signal and waits for the server to drain.
    pub async fn stop(mut self) -> std::io::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.handle.take() {
            Some(handle) => handle.await.expect("server task panicked"),
            None => Ok(()),
        }
    }
}
