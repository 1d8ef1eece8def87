#![allow(dead_code)]

use api_gateway::config::{GatewayConfig, UpstreamSettings};
use api_gateway::startup::Application;
use axum::{
    body::to_bytes,
    extract::Request,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use service_core::config::Config as CoreConfig;
use std::time::Duration;
use tokio::net::TcpListener;

pub fn gateway_config(upstream_url: &str, timeout_secs: u64) -> GatewayConfig {
    GatewayConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            host: "127.0.0.1".to_string(),
        },
        upstream: UpstreamSettings {
            url: upstream_url.to_string(),
            api_prefix: "/api".to_string(),
            timeout_secs,
            max_body_bytes: 10 * 1024 * 1024,
        },
    }
}

pub struct TestGateway {
    pub address: String,
    client: reqwest::Client,
}

impl TestGateway {
    pub async fn spawn(upstream_url: &str) -> Self {
        Self::spawn_with_timeout(upstream_url, 5).await
    }

    pub async fn spawn_with_timeout(upstream_url: &str, timeout_secs: u64) -> Self {
        let app = Application::build(gateway_config(upstream_url, timeout_secs))
            .await
            .expect("Failed to build gateway");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestGateway {
            address: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Address nothing listens on: bind a port, then release it.
pub async fn unreachable_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// Stand-in product service that echoes what it received.
pub async fn spawn_stub_upstream() -> String {
    let app = Router::new()
        .route(
            "/api/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        )
        .route(
            "/api/reject",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "name too short" })),
                )
            }),
        )
        .fallback(echo);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub upstream");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://127.0.0.1:{}", port)
}

async fn echo(req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let headers: Map<String, Value> = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect();

    let status = if parts.method == Method::POST {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    (
        status,
        [("x-upstream", "stub"), ("content-language", "en")],
        Json(json!({
            "method": parts.method.as_str(),
            "path": parts.uri.path(),
            "query": parts.uri.query(),
            "body": String::from_utf8_lossy(&bytes),
            "headers": headers,
        })),
    )
        .into_response()
}
