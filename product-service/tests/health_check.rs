mod common;

use common::TestApp;
use product_service::config::HealthMode;
use product_service::services::ConnectionPhase;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn strict_health_reports_connected_store() {
    let app = TestApp::spawn_with_mode(HealthMode::Strict).await;

    let response = app.health().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["ok"], true);
    assert_eq!(body["database"], "connected");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn strict_health_is_503_while_connecting() {
    let app = TestApp::spawn_with_mode(HealthMode::Strict).await;
    app.connection.set(ConnectionPhase::Connecting);

    let response = app.health().await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["database"], "connecting");
}

#[tokio::test]
async fn strict_health_tracks_every_phase_change() {
    let app = TestApp::spawn_with_mode(HealthMode::Strict).await;

    for (phase, expected) in [
        (ConnectionPhase::Disconnected, StatusCode::SERVICE_UNAVAILABLE),
        (ConnectionPhase::Connected, StatusCode::OK),
        (ConnectionPhase::Disconnecting, StatusCode::SERVICE_UNAVAILABLE),
    ] {
        app.connection.set(phase);
        let response = app.health().await;
        assert_eq!(response.status(), expected, "phase {}", phase);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["database"], phase.as_str());
    }
}

#[tokio::test]
async fn optimistic_health_is_ok_regardless_of_store() {
    let app = TestApp::spawn_with_mode(HealthMode::Optimistic).await;
    app.connection.set(ConnectionPhase::Connecting);

    let response = app.health().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["database"], "connecting");
    assert!(body.get("timestamp").is_none());

    app.connection.set(ConnectionPhase::Disconnected);
    assert_eq!(app.health().await.status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_returns_text() {
    let app = TestApp::spawn().await;

    let response = app
        .client()
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get("content-type")
        .expect("Missing content-type header")
        .to_str()
        .expect("Invalid content-type");
    assert!(content_type.starts_with("text/plain"));
}
