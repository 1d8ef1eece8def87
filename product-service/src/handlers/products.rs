use crate::dtos::ProductResponse;
use crate::startup::AppState;
use crate::validation::{ValidatedPagination, ValidatedProduct};
use axum::{extract::State, http::StatusCode, Json};
use futures::TryStreamExt;
use service_core::error::AppError;

/// `POST /api/products`. Only normalized values reach the store.
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedProduct(product): ValidatedProduct,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let stored = state.store.create(product).await?;

    tracing::info!(product_id = %stored.id, "Product created");

    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// `GET /api/products?limit=&skip=`, newest first.
pub async fn list_products(
    State(state): State<AppState>,
    ValidatedPagination(page): ValidatedPagination,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products: Vec<ProductResponse> = state
        .store
        .list(page)
        .await?
        .map_ok(ProductResponse::from)
        .try_collect()
        .await?;

    tracing::debug!(count = products.len(), limit = page.limit, skip = page.skip, "Products listed");

    Ok(Json(products))
}
