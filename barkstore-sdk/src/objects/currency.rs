use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// All currencies the storefront can denominate an amount in.
///
/// The set is closed on purpose: adding a currency is a compile-time
/// checked change everywhere an exhaustive `match` consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Native Solana token.
    Sol,
    /// BARK project token.
    Bark,
    /// USDC stablecoin.
    Usdc,
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
}

impl Currency {
    /// Number of decimal places in the currency's smallest unit
    /// (lamports, token base units, cents).
    pub const fn decimal_places(self) -> u32 {
        match self {
            Currency::Sol | Currency::Bark => 9,
            Currency::Usdc => 6,
            Currency::Usd | Currency::Eur => 2,
        }
    }

    /// Canonical uppercase currency code.
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Sol => "SOL",
            Currency::Bark => "BARK",
            Currency::Usdc => "USDC",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A currency code outside the supported table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported currency: {0}")]
pub struct UnsupportedCurrency(pub String);

impl FromStr for Currency {
    type Err = UnsupportedCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SOL" => Ok(Currency::Sol),
            "BARK" => Ok(Currency::Bark),
            "USDC" => Ok(Currency::Usdc),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(UnsupportedCurrency(s.to_string())),
        }
    }
}
