//! Checkout orchestration.
//!
//! Derives an order from the cart and catalog, quotes crypto totals
//! best-effort, and drives the phase machine
//!
//! ```text
//! Idle → Quoting → AwaitingUserChoice → Dispatching → Succeeded
//!                         ↑                   ↓
//!                         └──── retry ──── Failed
//! ```
//!
//! Orders are ephemeral: each checkout attempt re-derives one from the
//! current cart state. The flow never clears the cart — that happens only
//! when the user acknowledges the confirmation view.

use barkstore_sdk::objects::{CartLine, CryptoQuote, Currency, OrderLine, OrderSummary};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::pricing::{ConvertError, to_smallest_unit};

/// Flat shipping charged on every order, in USD.
pub const SHIPPING_USD: Decimal = dec!(10);

/// Errors raised by the checkout flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Checkout needs at least one cart line that matches the catalog.
    #[error("cart has no purchasable items")]
    EmptyOrder,

    #[error("cannot {action} in phase {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: CheckoutPhase,
    },
}

/// Phases of one checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    Quoting,
    AwaitingUserChoice,
    Dispatching,
    Succeeded,
    Failed,
}

/// Join the cart against the catalog and price the order.
///
/// Cart lines without a catalog match are skipped, mirroring how the
/// storefront renders them.
pub fn build_order(lines: &[CartLine], catalog: &Catalog) -> Result<OrderSummary, CheckoutError> {
    let order_lines: Vec<OrderLine> = lines
        .iter()
        .filter_map(|line| {
            catalog.get(line.id).map(|product| OrderLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price_usd: product.price,
                quantity: line.quantity,
                line_total_usd: product.price * Decimal::from(line.quantity),
            })
        })
        .collect();

    if order_lines.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }

    let subtotal_usd: Decimal = order_lines.iter().map(|l| l.line_total_usd).sum();
    Ok(OrderSummary {
        order_id: Uuid::new_v4(),
        lines: order_lines,
        subtotal_usd,
        shipping_usd: SHIPPING_USD,
        total_usd: subtotal_usd + SHIPPING_USD,
    })
}

/// Quote a USD total in `currency`, given the USD price of one unit.
pub fn crypto_quote(
    total_usd: Decimal,
    currency: Currency,
    usd_per_unit: Decimal,
) -> Result<CryptoQuote, ConvertError> {
    let total = total_usd
        .checked_div(usd_per_unit)
        .ok_or(ConvertError::InvalidAmount(usd_per_unit))?;
    let total_smallest_unit = to_smallest_unit(currency, total)?;
    Ok(CryptoQuote {
        currency,
        usd_per_unit,
        total,
        total_smallest_unit,
    })
}

/// One checkout attempt's phase machine.
#[derive(Debug)]
pub struct CheckoutFlow {
    phase: CheckoutPhase,
    order: Option<OrderSummary>,
    last_error: Option<String>,
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self {
            phase: CheckoutPhase::Idle,
            order: None,
            last_error: None,
        }
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    pub fn order(&self) -> Option<&OrderSummary> {
        self.order.as_ref()
    }

    /// Message of the most recent failed dispatch, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Idle → Quoting: derive the order from current cart contents.
    pub fn begin(
        &mut self,
        lines: &[CartLine],
        catalog: &Catalog,
    ) -> Result<&OrderSummary, CheckoutError> {
        if self.phase != CheckoutPhase::Idle {
            return Err(CheckoutError::InvalidTransition {
                action: "begin",
                phase: self.phase,
            });
        }
        let order = build_order(lines, catalog)?;
        self.phase = CheckoutPhase::Quoting;
        Ok(self.order.insert(order))
    }

    /// Quoting → AwaitingUserChoice. USD totals are known by now; crypto
    /// quotes stay best-effort and may still be pending.
    pub fn quotes_ready(&mut self) -> Result<(), CheckoutError> {
        if self.phase != CheckoutPhase::Quoting {
            return Err(CheckoutError::InvalidTransition {
                action: "mark quotes ready",
                phase: self.phase,
            });
        }
        self.phase = CheckoutPhase::AwaitingUserChoice;
        Ok(())
    }

    /// AwaitingUserChoice → Dispatching: exactly one method was selected.
    pub fn start_dispatch(&mut self) -> Result<(), CheckoutError> {
        if self.phase != CheckoutPhase::AwaitingUserChoice {
            return Err(CheckoutError::InvalidTransition {
                action: "start dispatch",
                phase: self.phase,
            });
        }
        self.phase = CheckoutPhase::Dispatching;
        Ok(())
    }

    /// Dispatching → Succeeded.
    pub fn succeed(&mut self) -> Result<(), CheckoutError> {
        if self.phase != CheckoutPhase::Dispatching {
            return Err(CheckoutError::InvalidTransition {
                action: "succeed",
                phase: self.phase,
            });
        }
        self.phase = CheckoutPhase::Succeeded;
        Ok(())
    }

    /// Dispatching → Failed. The error is surfaced to the user; the cart
    /// stays intact.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), CheckoutError> {
        if self.phase != CheckoutPhase::Dispatching {
            return Err(CheckoutError::InvalidTransition {
                action: "fail",
                phase: self.phase,
            });
        }
        self.last_error = Some(error.into());
        self.phase = CheckoutPhase::Failed;
        Ok(())
    }

    /// Failed → AwaitingUserChoice: the user retries or switches method.
    pub fn retry(&mut self) -> Result<(), CheckoutError> {
        if self.phase != CheckoutPhase::Failed {
            return Err(CheckoutError::InvalidTransition {
                action: "retry",
                phase: self.phase,
            });
        }
        self.phase = CheckoutPhase::AwaitingUserChoice;
        Ok(())
    }
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barkstore_sdk::objects::CartLine;

    fn cart(lines: &[(u32, u32)]) -> Vec<CartLine> {
        lines
            .iter()
            .map(|&(id, quantity)| CartLine { id, quantity })
            .collect()
    }

    #[test]
    fn test_order_totals() {
        // Two of product 1 at $1.00 plus $10.00 shipping.
        let catalog = Catalog::builtin();
        let order = build_order(&cart(&[(1, 2)]), &catalog).unwrap();

        assert_eq!(order.subtotal_usd, dec!(2.00));
        assert_eq!(order.shipping_usd, dec!(10));
        assert_eq!(order.total_usd, dec!(12.00));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 2);
    }

    #[test]
    fn test_unknown_products_are_skipped() {
        let catalog = Catalog::builtin();
        let order = build_order(&cart(&[(1, 1), (999, 5)]), &catalog).unwrap();
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.subtotal_usd, dec!(1.00));
    }

    #[test]
    fn test_empty_or_unmatched_cart_refused() {
        let catalog = Catalog::builtin();
        assert_eq!(build_order(&[], &catalog), Err(CheckoutError::EmptyOrder));
        assert_eq!(
            build_order(&cart(&[(999, 1)]), &catalog),
            Err(CheckoutError::EmptyOrder)
        );
    }

    #[test]
    fn test_sol_quote_end_to_end() {
        // $2.00 subtotal + $10.00 shipping at $100/SOL ⇒ exactly 0.12 SOL,
        // 120,000,000 lamports.
        let catalog = Catalog::builtin();
        let order = build_order(&cart(&[(1, 2)]), &catalog).unwrap();

        let quote = crypto_quote(order.total_usd, Currency::Sol, dec!(100)).unwrap();
        assert_eq!(quote.total, dec!(0.12));
        assert_eq!(quote.total_smallest_unit, 120_000_000);
    }

    #[test]
    fn test_flow_happy_path() {
        let catalog = Catalog::builtin();
        let mut flow = CheckoutFlow::new();
        assert_eq!(flow.phase(), CheckoutPhase::Idle);

        flow.begin(&cart(&[(2, 1)]), &catalog).unwrap();
        assert_eq!(flow.phase(), CheckoutPhase::Quoting);

        flow.quotes_ready().unwrap();
        assert_eq!(flow.phase(), CheckoutPhase::AwaitingUserChoice);

        flow.start_dispatch().unwrap();
        flow.succeed().unwrap();
        assert_eq!(flow.phase(), CheckoutPhase::Succeeded);
    }

    #[test]
    fn test_flow_failure_returns_to_choice() {
        let catalog = Catalog::builtin();
        let mut flow = CheckoutFlow::new();
        flow.begin(&cart(&[(2, 1)]), &catalog).unwrap();
        flow.quotes_ready().unwrap();
        flow.start_dispatch().unwrap();

        flow.fail("insufficient balance").unwrap();
        assert_eq!(flow.phase(), CheckoutPhase::Failed);
        assert_eq!(flow.last_error(), Some("insufficient balance"));

        flow.retry().unwrap();
        assert_eq!(flow.phase(), CheckoutPhase::AwaitingUserChoice);
        assert!(flow.order().is_some());
    }

    #[test]
    fn test_illegal_transitions_are_typed_errors() {
        let mut flow = CheckoutFlow::new();
        assert!(matches!(
            flow.start_dispatch(),
            Err(CheckoutError::InvalidTransition { .. })
        ));
        assert!(matches!(
            flow.succeed(),
            Err(CheckoutError::InvalidTransition { .. })
        ));
        assert!(matches!(
            flow.retry(),
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }
}
