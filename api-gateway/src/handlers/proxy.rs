use crate::services::upstream::RELAYED_RESPONSE_HEADERS;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::CONTENT_LENGTH,
    response::Response,
};
use http_body_util::LengthLimitError;
use service_core::error::AppError;

/// Relays a request under the API prefix to the product service and its
/// answer back, status and body untouched. No payload validation happens here.
pub async fn forward(State(state): State<AppState>, req: Request) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let max_body = state.settings.max_body_bytes;

    let declared = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > max_body as u64) {
        return Err(AppError::PayloadTooLarge);
    }

    let body = axum::body::to_bytes(body, max_body).await.map_err(|e| {
        let inner = e.into_inner();
        if inner.downcast_ref::<LengthLimitError>().is_some() {
            AppError::PayloadTooLarge
        } else {
            AppError::InternalError(anyhow::anyhow!("failed to read request body: {}", inner))
        }
    })?;

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path());

    let upstream = state
        .upstream
        .forward(parts.method.clone(), path_and_query, &parts.headers, body)
        .await?;

    let status = upstream.status();
    tracing::debug!(status = %status.as_u16(), "Upstream responded");

    let mut response = Response::builder().status(status);
    if let Some(headers) = response.headers_mut() {
        for name in RELAYED_RESPONSE_HEADERS {
            for value in upstream.headers().get_all(&name) {
                headers.append(name.clone(), value.clone());
            }
        }
    }

    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))
}
