//! Common helpers for workflow tests.

#![allow(dead_code)]

use serde_json::Value;
use std::time::Duration;
use workflow_tests::{deployed_gateway_url, wait_for_stack, Stack};

pub const STACK_TIMEOUT: Duration = Duration::from_secs(60);

pub async fn setup() -> Stack {
    Stack::spawn().await.expect("Failed to start stack")
}

/// Gateway URL of a deployed stack, once it reports healthy.
pub async fn deployed() -> String {
    let url = deployed_gateway_url();
    wait_for_stack(&url, STACK_TIMEOUT)
        .await
        .expect("Stack not healthy - start it with docker compose first");
    url
}

pub async fn create(stack: &Stack, body: &Value) -> reqwest::Response {
    stack
        .client()
        .post(stack.gateway("/api/products"))
        .json(body)
        .send()
        .await
        .expect("Failed to execute request")
}

pub async fn names(response: reqwest::Response) -> Vec<String> {
    let listed: Vec<Value> = response.json().await.expect("Failed to parse JSON");
    listed
        .iter()
        .map(|p| p["name"].as_str().unwrap_or_default().to_string())
        .collect()
}
