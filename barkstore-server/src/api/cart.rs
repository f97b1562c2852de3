//! Cart handlers.
//!
//! Every mutation responds with the updated cart view so the frontend can
//! re-render without a second round trip.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::state::AppState;

/// `GET /cart` — lines plus derived totals.
pub(super) async fn get_cart(state: State<AppState>) -> impl IntoResponse {
    let cart = state.cart.read().await;
    Json(cart.view(&state.catalog))
}

/// `POST /cart/{id}/increase` — add one of a product.
pub(super) async fn increase(state: State<AppState>, Path(id): Path<u32>) -> impl IntoResponse {
    let mut cart = state.cart.write().await;
    cart.increase(id);
    Json(cart.view(&state.catalog))
}

/// `POST /cart/{id}/decrease` — remove one of a product; the line
/// disappears at quantity 1 and an absent id is a no-op.
pub(super) async fn decrease(state: State<AppState>, Path(id): Path<u32>) -> impl IntoResponse {
    let mut cart = state.cart.write().await;
    cart.decrease(id);
    Json(cart.view(&state.catalog))
}

/// `DELETE /cart/{id}` — drop a line entirely.
pub(super) async fn remove(state: State<AppState>, Path(id): Path<u32>) -> impl IntoResponse {
    let mut cart = state.cart.write().await;
    cart.remove(id);
    Json(cart.view(&state.catalog))
}

/// `DELETE /cart` — empty the cart.
pub(super) async fn clear_cart(state: State<AppState>) -> impl IntoResponse {
    let mut cart = state.cart.write().await;
    cart.clear();
    Json(cart.view(&state.catalog))
}
