use axum::Json;
use serde_json::{json, Value};

/// The gateway's own liveness. Answers from process state only; never
/// contacts the upstream.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "ok": true }))
}
