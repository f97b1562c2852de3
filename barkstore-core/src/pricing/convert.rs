//! Conversion of whole-currency amounts into smallest integer units.

use barkstore_sdk::objects::Currency;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Errors that can occur during unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The amount is negative or does not fit the target unit.
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),
}

/// Convert `amount`, in whole units of `currency`, into the currency's
/// smallest integer unit (lamports, token base units, cents).
///
/// Rounds half-away-from-zero; amounts here are non-negative, so this is
/// plain round-half-up.
pub fn to_smallest_unit(currency: Currency, amount: Decimal) -> Result<u64, ConvertError> {
    if amount < Decimal::ZERO {
        return Err(ConvertError::InvalidAmount(amount));
    }
    let factor = Decimal::from(10u64.pow(currency.decimal_places()));
    let scaled = amount
        .checked_mul(factor)
        .ok_or(ConvertError::InvalidAmount(amount))?;
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(ConvertError::InvalidAmount(amount))
}
