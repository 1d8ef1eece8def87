use super::{validate_create, validate_pagination, Pagination, Rejection};
use crate::dtos::PaginationQuery;
use crate::models::NewProduct;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header::CONTENT_LENGTH, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde_json::Value;
use service_core::error::AppError;

/// Largest request body accepted by the service (1 MiB).
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Rejects requests whose declared `Content-Length` exceeds [`MAX_BODY_BYTES`]
/// before anything reads the body.
pub async fn payload_size_guard(req: Request, next: Next) -> Result<Response, AppError> {
    if let Some(declared) = declared_length(req.headers()) {
        if declared > MAX_BODY_BYTES as u64 {
            tracing::info!(declared, limit = MAX_BODY_BYTES, "Payload too large");
            return Err(AppError::PayloadTooLarge);
        }
    }
    Ok(next.run(req).await)
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// A create-product body that passed every rule, already normalized.
pub struct ValidatedProduct(pub NewProduct);

#[async_trait]
impl<S> FromRequest<S> for ValidatedProduct
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| {
                // Undeclared bodies over the limit surface here instead of in the guard.
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    return AppError::PayloadTooLarge;
                }
                tracing::debug!(error = %e, "Unreadable create body");
                AppError::from(Rejection::Malformed)
            })?;

        let product = validate_create(&body).map_err(|rejection| {
            tracing::info!(reason = %rejection, "Create request rejected");
            AppError::from(rejection)
        })?;

        Ok(ValidatedProduct(product))
    }
}

/// `limit`/`skip` from the query string, range-checked.
pub struct ValidatedPagination(pub Pagination);

#[async_trait]
impl<S> FromRequestParts<S> for ValidatedPagination
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Unreadable pagination query");
                AppError::from(Rejection::MalformedQuery)
            })?;

        let page = validate_pagination(query.limit.as_deref(), query.skip.as_deref())
            .map_err(|rejection| {
                tracing::info!(reason = %rejection, "List request rejected");
                AppError::from(rejection)
            })?;

        Ok(ValidatedPagination(page))
    }
}
