//! Card checkout via the payment processor's hosted sessions.
//!
//! Unlike the crypto dispatchers this path performs no transfer itself: it
//! creates a Checkout Session over the processor's REST API and returns
//! the hosted payment page URL. Completing the payment happens outside
//! this process, after the redirect.

use barkstore_sdk::objects::CheckoutRedirect;
use kanau::processor::Processor;
use serde::Deserialize;
use url::Url;

use super::PaymentError;

/// One named line item, unit amount in USD cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLineItem {
    pub name: String,
    pub unit_amount_cents: u64,
    pub quantity: u32,
}

/// Request to open a hosted card-checkout session.
#[derive(Debug, Clone)]
pub struct CardCheckoutRequest {
    pub line_items: Vec<CardLineItem>,
    /// Order subtotal in cents; shipping is added on top and the totals
    /// are carried to the confirmation page as query parameters.
    pub subtotal_cents: u64,
}

/// Fixed shipping charged on card orders, in cents.
pub const SHIPPING_CENTS: u64 = 1_000;

/// Destinations the processor may collect a shipping address for.
pub const ALLOWED_SHIPPING_COUNTRIES: [&str; 3] = ["US", "CA", "MX"];

const DELIVERY_ESTIMATE_BUSINESS_DAYS: (u32, u32) = (5, 7);

/// Dispatches card payments through the processor's session API.
pub struct CardDispatcher {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
    success_url: Url,
    cancel_url: Url,
}

impl CardDispatcher {
    pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

    pub fn new(secret_key: impl Into<String>, success_url: Url, cancel_url: Url) -> Self {
        Self::with_api_base(Self::DEFAULT_API_BASE, secret_key, success_url, cancel_url)
    }

    /// Point the dispatcher at a different API root (tests, proxies).
    pub fn with_api_base(
        api_base: impl Into<String>,
        secret_key: impl Into<String>,
        success_url: Url,
        cancel_url: Url,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_base: api_base.into(),
            secret_key: secret_key.into(),
            success_url,
            cancel_url,
        }
    }

    async fn create_session(
        &self,
        request: &CardCheckoutRequest,
    ) -> Result<CheckoutRedirect, PaymentError> {
        if request.line_items.is_empty() {
            return Err(PaymentError::SessionCreationFailed(
                "no line items in the cart".to_string(),
            ));
        }

        let params = session_params(request, &self.success_url, &self.cancel_url);
        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::SessionCreationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::SessionCreationFailed(format!(
                "status {status}: {body}"
            )));
        }

        #[derive(Debug, Deserialize)]
        struct Session {
            url: Url,
        }

        let session: Session = response
            .json()
            .await
            .map_err(|e| PaymentError::SessionCreationFailed(e.to_string()))?;
        Ok(CheckoutRedirect { url: session.url })
    }
}

/// Flatten the session description into the processor's bracketed form
/// encoding.
fn session_params(
    request: &CardCheckoutRequest,
    success_url: &Url,
    cancel_url: &Url,
) -> Vec<(String, String)> {
    let total_cents = request.subtotal_cents + SHIPPING_CENTS;

    // The confirmation page reconstructs the receipt from these.
    let mut success_url = success_url.clone();
    success_url
        .query_pairs_mut()
        .append_pair("amount", &total_cents.to_string())
        .append_pair("subtotal", &request.subtotal_cents.to_string())
        .append_pair("shipping", &SHIPPING_CENTS.to_string());

    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), success_url.to_string()),
        ("cancel_url".to_string(), cancel_url.to_string()),
    ];

    for (i, country) in ALLOWED_SHIPPING_COUNTRIES.iter().enumerate() {
        params.push((
            format!("shipping_address_collection[allowed_countries][{i}]"),
            (*country).to_string(),
        ));
    }

    let rate = "shipping_options[0][shipping_rate_data]";
    params.push((format!("{rate}[type]"), "fixed_amount".to_string()));
    params.push((
        format!("{rate}[fixed_amount][amount]"),
        SHIPPING_CENTS.to_string(),
    ));
    params.push((format!("{rate}[fixed_amount][currency]"), "usd".to_string()));
    params.push((format!("{rate}[display_name]"), "Shipping".to_string()));
    params.push((
        format!("{rate}[delivery_estimate][minimum][unit]"),
        "business_day".to_string(),
    ));
    params.push((
        format!("{rate}[delivery_estimate][minimum][value]"),
        DELIVERY_ESTIMATE_BUSINESS_DAYS.0.to_string(),
    ));
    params.push((
        format!("{rate}[delivery_estimate][maximum][unit]"),
        "business_day".to_string(),
    ));
    params.push((
        format!("{rate}[delivery_estimate][maximum][value]"),
        DELIVERY_ESTIMATE_BUSINESS_DAYS.1.to_string(),
    ));

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        params.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        params.push((
            format!("{prefix}[price_data][currency]"),
            "usd".to_string(),
        ));
        params.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount_cents.to_string(),
        ));
        params.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
    }

    params
}

impl Processor<CardCheckoutRequest> for CardDispatcher {
    type Output = CheckoutRedirect;
    type Error = PaymentError;

    async fn process(
        &self,
        request: CardCheckoutRequest,
    ) -> Result<CheckoutRedirect, PaymentError> {
        self.create_session(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_session_params_shipping_descriptor() {
        let success: Url = "https://shop.example/payment-success".parse().unwrap();
        let cancel: Url = "https://shop.example/cancel".parse().unwrap();
        let request = CardCheckoutRequest {
            line_items: vec![],
            subtotal_cents: 200,
        };
        let params = session_params(&request, &success, &cancel);

        assert_eq!(find(&params, "mode"), Some("payment"));
        assert_eq!(
            find(
                &params,
                "shipping_options[0][shipping_rate_data][fixed_amount][amount]"
            ),
            Some("1000")
        );
        assert_eq!(
            find(
                &params,
                "shipping_options[0][shipping_rate_data][delivery_estimate][minimum][value]"
            ),
            Some("5")
        );
        assert_eq!(
            find(
                &params,
                "shipping_options[0][shipping_rate_data][delivery_estimate][maximum][value]"
            ),
            Some("7")
        );
        assert_eq!(
            find(&params, "shipping_address_collection[allowed_countries][0]"),
            Some("US")
        );
        assert_eq!(
            find(&params, "shipping_address_collection[allowed_countries][2]"),
            Some("MX")
        );
    }

    #[test]
    fn test_success_url_carries_totals() {
        let success: Url = "https://shop.example/payment-success".parse().unwrap();
        let cancel: Url = "https://shop.example/cancel".parse().unwrap();
        let request = CardCheckoutRequest {
            line_items: vec![],
            subtotal_cents: 200,
        };
        let params = session_params(&request, &success, &cancel);

        let success_url = find(&params, "success_url").unwrap();
        assert!(success_url.contains("amount=1200"));
        assert!(success_url.contains("subtotal=200"));
        assert!(success_url.contains("shipping=1000"));
    }

    #[test]
    fn test_card_shipping_matches_order_shipping() {
        use crate::checkout::SHIPPING_USD;
        use crate::pricing::to_smallest_unit;
        use barkstore_sdk::objects::Currency;

        assert_eq!(
            to_smallest_unit(Currency::Usd, SHIPPING_USD),
            Ok(SHIPPING_CENTS)
        );
    }

    #[test]
    fn test_session_params_line_items() {
        let success: Url = "https://shop.example/payment-success".parse().unwrap();
        let cancel: Url = "https://shop.example/cancel".parse().unwrap();
        let request = CardCheckoutRequest {
            line_items: vec![
                CardLineItem {
                    name: "Product 1".to_string(),
                    unit_amount_cents: 100,
                    quantity: 2,
                },
                CardLineItem {
                    name: "Product 2".to_string(),
                    unit_amount_cents: 1_000,
                    quantity: 1,
                },
            ],
            subtotal_cents: 1_200,
        };
        let params = session_params(&request, &success, &cancel);

        assert_eq!(find(&params, "line_items[0][quantity]"), Some("2"));
        assert_eq!(
            find(&params, "line_items[0][price_data][unit_amount]"),
            Some("100")
        );
        assert_eq!(
            find(&params, "line_items[1][price_data][product_data][name]"),
            Some("Product 2")
        );
    }

    #[tokio::test]
    async fn test_empty_line_items_rejected_without_network() {
        let success: Url = "https://shop.example/payment-success".parse().unwrap();
        let cancel: Url = "https://shop.example/cancel".parse().unwrap();
        let dispatcher = CardDispatcher::with_api_base(
            "http://127.0.0.1:1",
            "sk_test_unused",
            success,
            cancel,
        );

        let err = dispatcher
            .process(CardCheckoutRequest {
                line_items: vec![],
                subtotal_cents: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::SessionCreationFailed(_)));
    }
}
