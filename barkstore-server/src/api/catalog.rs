//! Catalog handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use barkstore_sdk::objects::Product;

use super::ApiError;
use crate::state::AppState;

/// `GET /products` — the full catalog, in catalog order.
pub(super) async fn list_products(state: State<AppState>) -> impl IntoResponse {
    Json(state.catalog.products().to_vec())
}

/// `GET /products/{id}` — one catalog entry.
pub(super) async fn get_product(
    state: State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Product>, ApiError> {
    state
        .catalog
        .get(id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::ProductNotFound)
}
