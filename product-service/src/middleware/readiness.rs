use crate::services::ConnectionMonitor;
use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use service_core::error::AppError;
use std::sync::Arc;

/// Fails fast with 503 while the store is not connected: requests that
/// arrive before the first connection, or during an outage, are answered
/// immediately instead of queueing.
pub async fn require_store_ready(
    State(monitor): State<Arc<ConnectionMonitor>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !monitor.is_connected() {
        tracing::warn!(phase = %monitor.phase(), "Rejecting request, store not ready");
        return Err(AppError::NotReady);
    }
    Ok(next.run(req).await)
}
