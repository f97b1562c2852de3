//! Pricing: USD → smallest-unit conversion and the asset price oracle.

pub mod convert;
pub mod oracle;

pub use convert::{ConvertError, to_smallest_unit};
pub use oracle::{
    CoinGeckoSource, FRESHNESS_WINDOW, OracleAsset, OracleError, PriceOracle, PriceQuote,
    PriceSource,
};
