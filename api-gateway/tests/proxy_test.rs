mod common;

use common::{spawn_stub_upstream, TestGateway};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn forwards_method_path_query_and_body() {
    let gateway = TestGateway::spawn(&spawn_stub_upstream().await).await;

    let response = gateway
        .client()
        .post(gateway.url("/api/products?source=test"))
        .header("x-request-id", "req-123")
        .header("accept", "application/json")
        .json(&json!({ "name": "Widget", "price": 4.5 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(response.headers()["content-language"], "en");
    assert_eq!(response.headers()["x-request-id"], "req-123");
    assert!(
        response.headers().get("x-upstream").is_none(),
        "only content-negotiation headers are relayed"
    );

    let echoed: Value = response.json().await.unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/api/products");
    assert_eq!(echoed["query"], "source=test");
    let body: Value = serde_json::from_str(echoed["body"].as_str().unwrap()).unwrap();
    assert_eq!(body, json!({ "name": "Widget", "price": 4.5 }));

    let headers = &echoed["headers"];
    assert_eq!(headers["x-request-id"], "req-123");
    assert_eq!(headers["accept"], "application/json");
    assert_eq!(headers["content-type"], "application/json");
}

#[tokio::test]
async fn bare_prefix_is_forwarded() {
    let gateway = TestGateway::spawn(&spawn_stub_upstream().await).await;

    let response = gateway.client().get(gateway.url("/api")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let echoed: Value = response.json().await.unwrap();
    assert_eq!(echoed["path"], "/api");
    assert_eq!(echoed["method"], "GET");
}

#[tokio::test]
async fn upstream_rejection_is_relayed_unchanged() {
    let gateway = TestGateway::spawn(&spawn_stub_upstream().await).await;

    let response = gateway
        .client()
        .post(gateway.url("/api/reject"))
        .json(&json!({ "name": "AB" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "name too short" }));
}

#[tokio::test]
async fn paths_outside_prefix_stay_local() {
    let gateway = TestGateway::spawn(&spawn_stub_upstream().await).await;

    let response = gateway
        .client()
        .get(gateway.url("/products"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "not found");
}

#[tokio::test]
async fn slow_upstream_times_out_as_unavailable() {
    let gateway = TestGateway::spawn_with_timeout(&spawn_stub_upstream().await, 1).await;

    let response = gateway
        .client()
        .get(gateway.url("/api/slow"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "upstream unavailable");
}
