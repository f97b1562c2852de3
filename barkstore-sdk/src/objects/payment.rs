use super::currency::Currency;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Payment paths offered at checkout.
///
/// Exactly one is selected per dispatch attempt; the orchestrator matches
/// exhaustively so a new method cannot be added without handling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Sol,
    Usdc,
    Bark,
    Card,
}

impl PaymentMethod {
    /// The currency a crypto payment is denominated in; `None` for card.
    pub const fn currency(self) -> Option<Currency> {
        match self {
            PaymentMethod::Sol => Some(Currency::Sol),
            PaymentMethod::Usdc => Some(Currency::Usdc),
            PaymentMethod::Bark => Some(Currency::Bark),
            PaymentMethod::Card => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PaymentMethod::Sol => "sol",
            PaymentMethod::Usdc => "usdc",
            PaymentMethod::Bark => "bark",
            PaymentMethod::Card => "card",
        };
        f.write_str(name)
    }
}

/// Outcome of a single crypto transfer attempt.
///
/// `signature` is present iff the transfer succeeded; `error` is present
/// iff it did not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<CompactString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferResult {
    /// A confirmed transfer.
    pub fn ok(signature: impl Into<CompactString>) -> Self {
        Self {
            success: true,
            signature: Some(signature.into()),
            error: None,
        }
    }

    /// A failed transfer with a user-displayable message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            signature: None,
            error: Some(error.into()),
        }
    }
}

/// Card checkout does not transfer funds in-process; it hands the user a
/// hosted payment page to follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub url: url::Url,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_result_invariant() {
        let ok = TransferResult::ok("5wHu1qwD");
        assert!(ok.success);
        assert!(ok.signature.is_some());
        assert!(ok.error.is_none());

        let failed = TransferResult::failed("insufficient balance");
        assert!(!failed.success);
        assert!(failed.signature.is_none());
        assert!(failed.error.is_some());
    }

    #[test]
    fn test_payment_method_currency() {
        assert_eq!(PaymentMethod::Sol.currency(), Some(Currency::Sol));
        assert_eq!(PaymentMethod::Card.currency(), None);
    }

    #[test]
    fn test_payment_method_serde() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Bark).unwrap(),
            "\"bark\""
        );
        let back: PaymentMethod = serde_json::from_str("\"card\"").unwrap();
        assert_eq!(back, PaymentMethod::Card);
    }
}
