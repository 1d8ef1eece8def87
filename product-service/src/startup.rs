use crate::config::{ProductConfig, StoreBackend};
use crate::handlers;
use crate::middleware::require_store_ready;
use crate::services::{
    ConnectionMonitor, ConnectionPhase, HealthAggregator, InMemoryProductStore, MongoDb,
    MongoProductStore, ProductStore,
};
use crate::validation::{payload_size_guard, MAX_BODY_BYTES};
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, RequestSpan};
use service_core::shutdown::shutdown_signal;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub health: HealthAggregator,
    pub connection: Arc<ConnectionMonitor>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ProductStore>,
        connection: Arc<ConnectionMonitor>,
        health: HealthAggregator,
    ) -> Self {
        Self {
            store,
            health,
            connection,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Outermost first: readiness gate, declared-size guard, then the body cap.
    let products = Router::new()
        .route(
            "/api/products",
            post(handlers::create_product).get(handlers::list_products),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(payload_size_guard))
        .layer(from_fn_with_state(
            state.connection.clone(),
            require_store_ready,
        ));

    Router::new()
        .merge(products)
        .route("/api/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .fallback(handlers::not_found)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
    mongo: Option<MongoDb>,
}

impl Application {
    /// Binds the listener and starts connecting to the configured store.
    /// The listener is up before the store is; see [`require_store_ready`].
    pub async fn build(config: ProductConfig) -> Result<Self, AppError> {
        let connection = Arc::new(ConnectionMonitor::new());

        let (store, mongo): (Arc<dyn ProductStore>, Option<MongoDb>) = match config.store.backend
        {
            StoreBackend::MongoDb => {
                let mongo_config = config.store.mongodb.as_ref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!("MONGODB_URI is required but not set"))
                })?;
                let db = MongoDb::connect(mongo_config, connection.clone()).await?;

                let ready_db = db.clone();
                let ready_connection = connection.clone();
                tokio::spawn(async move {
                    ready_db.wait_until_ready(ready_connection).await;
                });

                let store: Arc<dyn ProductStore> = Arc::new(MongoProductStore::new(db.clone()));
                (store, Some(db))
            }
            StoreBackend::Memory => {
                tracing::info!("Using in-memory product store");
                connection.set(ConnectionPhase::Connected);
                let store: Arc<dyn ProductStore> = Arc::new(InMemoryProductStore::new());
                (store, None)
            }
        };

        let health = HealthAggregator::new(connection.clone(), config.health_mode);
        tracing::info!(mode = ?config.health_mode, "Health reporting configured");

        let state = AppState::new(store, connection, health);
        let mut app = Self::with_state(&config, state).await?;
        app.mongo = mongo;
        Ok(app)
    }

    /// Binds the listener around an already assembled state.
    pub async fn with_state(config: &ProductConfig, state: AppState) -> Result<Self, AppError> {
        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state.clone()),
            state,
            mongo: None,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serves until `signal` resolves, drains in-flight requests, then closes
    /// the store connection.
    pub async fn run_until<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            router,
            state,
            mongo,
            ..
        } = self;

        axum::serve(listener, router)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("Server drained, closing store connection");
        state.connection.set(ConnectionPhase::Disconnecting);
        if let Some(db) = mongo {
            db.shutdown().await;
        }
        state.connection.set(ConnectionPhase::Disconnected);

        Ok(())
    }
}
