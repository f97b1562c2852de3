use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cart line. Unique per product id; quantity is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: u32,
    pub quantity: u32,
}

/// Cart contents plus derived totals, as returned by `GET /cart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total_quantity: u32,
    pub subtotal_usd: Decimal,
}
