//! Checkout handlers.
//!
//! Each request derives a fresh order from the current cart — orders are
//! ephemeral and attempts are independent. The dispatch handler drives the
//! checkout phase machine and matches exhaustively over the payment
//! method, so adding a method is a compile-checked change.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use barkstore_core::checkout::{CheckoutError, CheckoutFlow, crypto_quote};
use barkstore_core::payments::{
    CardCheckoutRequest, CardLineItem, NativeTransferRequest, TokenTransferRequest, explorer_url,
};
use barkstore_core::pricing::{ConvertError, OracleAsset, OracleError, to_smallest_unit};
use barkstore_sdk::objects::{
    CryptoQuoteEntry, Currency, OrderSummary, PayRequest, PayResponse, PaymentMethod,
    QuoteResponse, TransferResult,
};
use kanau::processor::Processor;
use rust_decimal::Decimal;
use std::convert::Infallible;
use tracing::warn;

use super::ApiError;
use crate::state::AppState;

/// Crypto currencies offered at checkout.
const OFFERED_CRYPTO: [Currency; 3] = [Currency::Sol, Currency::Usdc, Currency::Bark];

// ---------------------------------------------------------------------------
// GET /checkout/quote
// ---------------------------------------------------------------------------

/// `GET /checkout/quote` — derive the order from the cart and quote it in
/// USD plus, best-effort, in each offered crypto currency.
///
/// A crypto total whose price cannot be resolved is returned as `null`
/// rather than blocking checkout; the frontend shows it as pending.
pub(super) async fn quote(state: State<AppState>) -> Result<Json<QuoteResponse>, ApiError> {
    let mut flow = CheckoutFlow::new();
    let lines = state.cart.read().await.lines().to_vec();
    let order = begin_flow(&mut flow, &lines, &state)?;

    let mut crypto = Vec::with_capacity(OFFERED_CRYPTO.len());
    for currency in OFFERED_CRYPTO {
        let quote = match usd_per_unit(&state, currency).await {
            Ok(rate) => match crypto_quote(order.total_usd, currency, rate) {
                Ok(q) => Some(q),
                Err(e) => {
                    warn!(%currency, error = %e, "failed to convert order total");
                    None
                }
            },
            Err(e) => {
                warn!(%currency, error = %e, "price quote unavailable, shown as pending");
                None
            }
        };
        crypto.push(CryptoQuoteEntry { currency, quote });
    }

    flow.quotes_ready().map_err(internal)?;
    Ok(Json(QuoteResponse { order, crypto }))
}

// ---------------------------------------------------------------------------
// POST /checkout/pay
// ---------------------------------------------------------------------------

/// `POST /checkout/pay` — dispatch exactly one payment method.
///
/// Failures never clear the cart and never surface as HTTP errors: they
/// come back as [`PayResponse::Failed`] with a retry affordance.
pub(super) async fn pay(
    state: State<AppState>,
    Json(request): Json<PayRequest>,
) -> Result<Json<PayResponse>, ApiError> {
    let mut flow = CheckoutFlow::new();
    let lines = state.cart.read().await.lines().to_vec();
    let order = begin_flow(&mut flow, &lines, &state)?;
    flow.quotes_ready().map_err(internal)?;
    flow.start_dispatch().map_err(internal)?;

    let response = match request.method {
        PaymentMethod::Card => dispatch_card(&state, &mut flow, &order).await?,
        PaymentMethod::Sol => dispatch_sol(&state, &mut flow, &order).await?,
        PaymentMethod::Usdc => {
            dispatch_token(&state, &mut flow, &order, PaymentMethod::Usdc).await?
        }
        PaymentMethod::Bark => {
            dispatch_token(&state, &mut flow, &order, PaymentMethod::Bark).await?
        }
    };
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// POST /checkout/acknowledge
// ---------------------------------------------------------------------------

/// `POST /checkout/acknowledge` — the user acknowledged the confirmation
/// view. Only now is the cart cleared; a dismissed or failed dispatch
/// leaves it intact.
pub(super) async fn acknowledge(state: State<AppState>) -> StatusCode {
    state.cart.write().await.clear();
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// Dispatch paths
// ---------------------------------------------------------------------------

async fn dispatch_card(
    state: &AppState,
    flow: &mut CheckoutFlow,
    order: &OrderSummary,
) -> Result<PayResponse, ApiError> {
    let Some(card) = &state.payments.card else {
        return fail(flow, PaymentMethod::Card, "card checkout is not configured");
    };

    let request = match card_request(order) {
        Ok(request) => request,
        Err(e) => return fail(flow, PaymentMethod::Card, e.to_string()),
    };

    match card.process(request).await {
        Ok(redirect) => {
            // Following the hosted page URL transfers control out of this
            // process; the dispatch itself is done.
            flow.succeed().map_err(internal)?;
            Ok(PayResponse::Redirect { url: redirect.url })
        }
        Err(e) => fail(flow, PaymentMethod::Card, e.to_string()),
    }
}

async fn dispatch_sol(
    state: &AppState,
    flow: &mut CheckoutFlow,
    order: &OrderSummary,
) -> Result<PayResponse, ApiError> {
    let amount = match order_total_in(state, order, Currency::Sol).await {
        Ok(amount) => amount,
        Err(message) => return fail(flow, PaymentMethod::Sol, message),
    };

    let result = infallible(
        state
            .payments
            .native
            .process(NativeTransferRequest {
                amount,
                recipient: state.payments.store_wallet,
            })
            .await,
    );
    finish(state, flow, order, PaymentMethod::Sol, result)
}

async fn dispatch_token(
    state: &AppState,
    flow: &mut CheckoutFlow,
    order: &OrderSummary,
    method: PaymentMethod,
) -> Result<PayResponse, ApiError> {
    let (currency, mint) = match method {
        PaymentMethod::Usdc => (Currency::Usdc, state.payments.usdc_mint),
        PaymentMethod::Bark => (Currency::Bark, state.payments.bark_mint),
        PaymentMethod::Sol | PaymentMethod::Card => {
            return Err(ApiError::Internal(format!(
                "{method} is not a token payment method"
            )));
        }
    };

    let amount = match order_total_in(state, order, currency).await {
        Ok(amount) => amount,
        Err(message) => return fail(flow, method, message),
    };

    let result = infallible(
        state
            .payments
            .token
            .process(TokenTransferRequest {
                amount,
                currency,
                mint,
                recipient: state.payments.store_wallet,
            })
            .await,
    );
    finish(state, flow, order, method, result)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn begin_flow(
    flow: &mut CheckoutFlow,
    lines: &[barkstore_sdk::objects::CartLine],
    state: &AppState,
) -> Result<OrderSummary, ApiError> {
    match flow.begin(lines, &state.catalog) {
        Ok(order) => Ok(order.clone()),
        Err(CheckoutError::EmptyOrder) => Err(ApiError::EmptyCart),
        Err(e) => Err(internal(e)),
    }
}

/// USD price of one unit of a crypto currency. The stablecoin is pegged
/// for both display and dispatch; volatile assets go through the oracle.
async fn usd_per_unit(state: &AppState, currency: Currency) -> Result<Decimal, OracleError> {
    match currency {
        Currency::Sol => state.oracle.usd_price(OracleAsset::Sol).await,
        Currency::Bark => state.oracle.usd_price(OracleAsset::Bark).await,
        Currency::Usdc | Currency::Usd | Currency::Eur => Ok(Decimal::ONE),
    }
}

/// The order total converted into whole units of `currency`, or a
/// user-displayable reason why it cannot be.
async fn order_total_in(
    state: &AppState,
    order: &OrderSummary,
    currency: Currency,
) -> Result<Decimal, String> {
    let rate = usd_per_unit(state, currency)
        .await
        .map_err(|e| format!("price quote unavailable: {e}"))?;
    order
        .total_usd
        .checked_div(rate)
        .ok_or_else(|| format!("price quote unavailable: zero {currency} rate"))
}

fn card_request(order: &OrderSummary) -> Result<CardCheckoutRequest, ConvertError> {
    let line_items = order
        .lines
        .iter()
        .map(|line| {
            Ok(CardLineItem {
                name: line.name.to_string(),
                unit_amount_cents: to_smallest_unit(Currency::Usd, line.unit_price_usd)?,
                quantity: line.quantity,
            })
        })
        .collect::<Result<Vec<_>, ConvertError>>()?;

    Ok(CardCheckoutRequest {
        line_items,
        subtotal_cents: to_smallest_unit(Currency::Usd, order.subtotal_usd)?,
    })
}

/// Turn a dispatcher's [`TransferResult`] into the API response, driving
/// the flow to `Succeeded` or `Failed`.
fn finish(
    state: &AppState,
    flow: &mut CheckoutFlow,
    order: &OrderSummary,
    method: PaymentMethod,
    result: TransferResult,
) -> Result<PayResponse, ApiError> {
    match (result.success, result.signature) {
        (true, Some(signature)) => {
            flow.succeed().map_err(internal)?;
            let explorer = explorer_url(&signature, &state.cluster);
            Ok(PayResponse::Paid {
                order: order.clone(),
                method,
                signature,
                explorer_url: explorer,
            })
        }
        _ => {
            let error = result
                .error
                .unwrap_or_else(|| "transfer failed".to_string());
            flow.fail(error.clone()).map_err(internal)?;
            Ok(PayResponse::Failed { method, error })
        }
    }
}

fn fail(
    flow: &mut CheckoutFlow,
    method: PaymentMethod,
    error: impl Into<String>,
) -> Result<PayResponse, ApiError> {
    let error = error.into();
    flow.fail(error.clone()).map_err(internal)?;
    Ok(PayResponse::Failed { method, error })
}

fn internal(error: impl std::fmt::Display) -> ApiError {
    ApiError::Internal(error.to_string())
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
