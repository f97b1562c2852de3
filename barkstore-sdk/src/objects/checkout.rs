use super::currency::Currency;
use super::payment::PaymentMethod;
use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One priced order line: a cart line joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: u32,
    pub name: CompactString,
    pub unit_price_usd: Decimal,
    pub quantity: u32,
    pub line_total_usd: Decimal,
}

/// Itemized order totals. Orders are ephemeral: derived at checkout time
/// and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub lines: Vec<OrderLine>,
    pub subtotal_usd: Decimal,
    pub shipping_usd: Decimal,
    pub total_usd: Decimal,
}

/// The order total quoted in one crypto currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuote {
    pub currency: Currency,
    pub usd_per_unit: Decimal,
    /// Total in whole units of the currency (e.g. 0.12 SOL).
    pub total: Decimal,
    /// Total in the currency's smallest unit (e.g. lamports).
    pub total_smallest_unit: u64,
}

/// Quote for one offered crypto currency. `quote` is `None` while no
/// fresh price is available; display it as pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuoteEntry {
    pub currency: Currency,
    pub quote: Option<CryptoQuote>,
}

/// Response of `GET /checkout/quote`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub order: OrderSummary,
    pub crypto: Vec<CryptoQuoteEntry>,
}

/// Request body of `POST /checkout/pay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRequest {
    pub method: PaymentMethod,
}

/// Result of a payment dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayResponse {
    /// Card path: follow the hosted checkout URL to complete payment.
    Redirect { url: url::Url },
    /// Crypto path: the transfer is confirmed on-chain.
    Paid {
        order: OrderSummary,
        method: PaymentMethod,
        signature: CompactString,
        explorer_url: String,
    },
    /// Dispatch failed. The cart is untouched; retry or switch method.
    Failed {
        method: PaymentMethod,
        error: String,
    },
}

/// Contact form fields relayed to the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Newsletter signup relayed to the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterSignup {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pay_response_tagging() {
        let failed = PayResponse::Failed {
            method: PaymentMethod::Sol,
            error: "wallet not connected".to_string(),
        };
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains("\"status\":\"failed\""));

        let back: PayResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, failed);
    }

    #[test]
    fn test_crypto_quote_serde() {
        let entry = CryptoQuoteEntry {
            currency: Currency::Sol,
            quote: Some(CryptoQuote {
                currency: Currency::Sol,
                usd_per_unit: dec!(100),
                total: dec!(0.12),
                total_smallest_unit: 120_000_000,
            }),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: CryptoQuoteEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
