//! Payment dispatch.
//!
//! Four mutually exclusive, user-selected payment paths: hosted card
//! checkout, native SOL, USDC and BARK token transfers. None of them
//! retries automatically — a failure surfaces immediately and the checkout
//! flow offers a manual retry.
//!
//! The crypto dispatchers normalize every failure into a
//! [`TransferResult`](barkstore_sdk::objects::TransferResult) at their
//! boundary; the card dispatcher returns a
//! [`CheckoutRedirect`](barkstore_sdk::objects::CheckoutRedirect) because
//! its success hands control to an external hosted page instead of
//! producing a signed transfer.

pub mod card;
pub mod native;
pub mod token;
pub mod wallet;

pub use card::{CardCheckoutRequest, CardDispatcher, CardLineItem};
pub use native::{NativeDispatcher, NativeTransferRequest};
pub use token::{TokenDispatcher, TokenTransferRequest};
pub use wallet::{KeypairSender, TransactionSender};

use thiserror::Error;

/// Errors raised while dispatching a payment.
///
/// The validation variants (`WalletNotConnected`, `InvalidAmount`) are
/// checked synchronously before any network call.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("sender wallet is not connected")]
    WalletNotConnected,

    #[error("invalid amount: {0}")]
    InvalidAmount(rust_decimal::Decimal),

    #[error("insufficient balance: have {balance} base units, need {required}")]
    InsufficientBalance { balance: u64, required: u64 },

    #[error("account lookup failed: {0}")]
    AccountLookupFailed(String),

    #[error("checkout session creation failed: {0}")]
    SessionCreationFailed(String),

    #[error("transfer submission failed: {0}")]
    TransferSubmissionFailed(String),

    #[error(transparent)]
    Convert(#[from] crate::pricing::ConvertError),
}

/// Public block-explorer link for a confirmed transaction.
pub fn explorer_url(signature: &str, cluster: &str) -> String {
    format!("https://explorer.solana.com/tx/{signature}?cluster={cluster}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explorer_url_format() {
        assert_eq!(
            explorer_url("5wHu1qwD", "devnet"),
            "https://explorer.solana.com/tx/5wHu1qwD?cluster=devnet"
        );
    }
}
