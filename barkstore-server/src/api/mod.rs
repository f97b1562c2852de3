//! Storefront REST API.
//!
//! # Endpoints
//!
//! - `GET    /products`              – full catalog
//! - `GET    /products/{id}`         – one product
//! - `GET    /cart`                  – lines plus derived totals
//! - `POST   /cart/{id}/increase`    – add one of a product
//! - `POST   /cart/{id}/decrease`    – remove one of a product
//! - `DELETE /cart/{id}`             – drop a line entirely
//! - `DELETE /cart`                  – empty the cart
//! - `GET    /checkout/quote`        – order totals + crypto quotes
//! - `POST   /checkout/pay`          – dispatch one payment method
//! - `POST   /checkout/acknowledge`  – confirm receipt, clearing the cart
//! - `POST   /contact`               – relay a contact form to the CRM
//! - `POST   /newsletter`            – relay a newsletter signup

mod cart;
mod catalog;
mod checkout;
mod contact;

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Build the storefront API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::list_products))
        .route("/products/{id}", get(catalog::get_product))
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/{id}/increase", post(cart::increase))
        .route("/cart/{id}/decrease", post(cart::decrease))
        .route("/cart/{id}", delete(cart::remove))
        .route("/checkout/quote", get(checkout::quote))
        .route("/checkout/pay", post(checkout::pay))
        .route("/checkout/acknowledge", post(checkout::acknowledge))
        .route("/contact", post(contact::submit_contact))
        .route("/newsletter", post(contact::subscribe_newsletter))
}

/// Errors that can occur in storefront API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The requested product was not found.
    ProductNotFound,
    /// Checkout needs at least one purchasable cart line.
    EmptyCart,
    /// A checkout flow transition was driven out of order.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::ProductNotFound => {
                (StatusCode::NOT_FOUND, "product not found").into_response()
            }
            ApiError::EmptyCart => {
                (StatusCode::CONFLICT, "cart has no purchasable items").into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "storefront API internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
