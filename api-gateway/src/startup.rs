use crate::config::GatewayConfig;
use crate::handlers;
use crate::services::UpstreamClient;
use crate::AppState;
use axum::{
    middleware::from_fn,
    routing::{any, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, RequestSpan};
use service_core::shutdown::shutdown_signal;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let prefix = state.settings.api_prefix.clone();

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route(&prefix, any(handlers::forward))
        .route(&format!("{}/*rest", prefix), any(handlers::forward))
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
}

impl Application {
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let upstream = Arc::new(UpstreamClient::new(&config.upstream)?);
        let state = AppState::new(upstream, config.upstream.clone());

        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            prefix = %config.upstream.api_prefix,
            "Starting api-gateway on port {}",
            port
        );

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serves until `signal` resolves, letting in-flight forwards finish.
    pub async fn run_until<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}
