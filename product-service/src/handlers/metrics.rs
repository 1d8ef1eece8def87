use axum::{http::StatusCode, response::IntoResponse};
use service_core::observability::get_metrics;

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
