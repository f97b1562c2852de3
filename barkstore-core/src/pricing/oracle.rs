//! USD price quotes for volatile assets, cached per freshness window.
//!
//! The oracle is lazily populated and invalidated by time only: a quote
//! older than the freshness window is refetched on the next request, and
//! no background refresh runs. Fetch and shape failures propagate as a
//! typed [`OracleError`] for every asset — callers decide how to degrade
//! (the quote endpoint shows the affected total as pending).

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;

/// Assets the oracle can quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleAsset {
    Sol,
    Bark,
}

impl OracleAsset {
    /// Asset identifier on the price API.
    pub const fn api_id(self) -> &'static str {
        match self {
            OracleAsset::Sol => "solana",
            OracleAsset::Bark => "bark",
        }
    }
}

impl std::fmt::Display for OracleAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_id())
    }
}

/// Errors that can occur while fetching a price.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("price request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("price API returned status {0}")]
    Status(u16),

    #[error("price response missing usd field for {0}")]
    MalformedResponse(&'static str),

    #[error("non-positive price {price} for {asset}")]
    NonPositivePrice {
        asset: &'static str,
        price: Decimal,
    },
}

/// A cached price observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub usd_per_unit: Decimal,
    pub fetched_at: OffsetDateTime,
}

/// Source of fresh prices.
///
/// Implemented over HTTP in production; tests substitute counting mocks.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_usd_price(&self, asset: OracleAsset) -> Result<Decimal, OracleError>;
}

/// CoinGecko `simple/price` source.
pub struct CoinGeckoSource {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoSource {
    pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    /// Point the source at a different API root (tests, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into(),
        }
    }
}

impl Default for CoinGeckoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    async fn fetch_usd_price(&self, asset: OracleAsset) -> Result<Decimal, OracleError> {
        #[derive(Debug, serde::Deserialize)]
        struct VsCurrencies {
            usd: Option<Decimal>,
        }

        let url = format!("{}/simple/price", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("ids", asset.api_id()), ("vs_currencies", "usd")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        let mut body: HashMap<String, VsCurrencies> = response.json().await?;
        let price = body
            .remove(asset.api_id())
            .and_then(|v| v.usd)
            .ok_or(OracleError::MalformedResponse(asset.api_id()))?;

        if price <= Decimal::ZERO {
            return Err(OracleError::NonPositivePrice {
                asset: asset.api_id(),
                price,
            });
        }
        Ok(price)
    }
}

/// How long a fetched quote may be reused.
pub const FRESHNESS_WINDOW: Duration = Duration::minutes(5);

/// Lazily populated, time-invalidated price cache over a [`PriceSource`].
///
/// Redundant concurrent fetches for the same asset are tolerated; the
/// freshness window already bounds the fetch rate under normal use.
pub struct PriceOracle<S> {
    source: S,
    freshness: Duration,
    cache: RwLock<HashMap<OracleAsset, PriceQuote>>,
}

impl PriceOracle<CoinGeckoSource> {
    /// Production oracle: CoinGecko with the 5-minute freshness window.
    pub fn coingecko() -> Self {
        Self::new(CoinGeckoSource::new(), FRESHNESS_WINDOW)
    }
}

impl<S: PriceSource> PriceOracle<S> {
    pub fn new(source: S, freshness: Duration) -> Self {
        Self {
            source,
            freshness,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// USD price per whole unit of `asset`.
    ///
    /// Returns the cached quote when it is younger than the freshness
    /// window; otherwise fetches, caches and returns a new one.
    pub async fn usd_price(&self, asset: OracleAsset) -> Result<Decimal, OracleError> {
        let now = OffsetDateTime::now_utc();
        {
            let cache = self.cache.read().await;
            if let Some(quote) = cache.get(&asset) {
                if now - quote.fetched_at < self.freshness {
                    return Ok(quote.usd_per_unit);
                }
            }
        }

        let price = self.source.fetch_usd_price(asset).await?;
        let mut cache = self.cache.write().await;
        cache.insert(
            asset,
            PriceQuote {
                usd_per_unit: price,
                fetched_at: now,
            },
        );
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingSource {
        calls: AtomicU32,
        price: Decimal,
    }

    impl CountingSource {
        fn new(price: Decimal) -> Self {
            Self {
                calls: AtomicU32::new(0),
                price,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceSource for CountingSource {
        async fn fetch_usd_price(&self, _asset: OracleAsset) -> Result<Decimal, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.price)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PriceSource for FailingSource {
        async fn fetch_usd_price(&self, asset: OracleAsset) -> Result<Decimal, OracleError> {
            Err(OracleError::MalformedResponse(asset.api_id()))
        }
    }

    #[tokio::test]
    async fn test_fresh_quote_is_reused() {
        let oracle = PriceOracle::new(CountingSource::new(dec!(100)), FRESHNESS_WINDOW);

        assert_eq!(oracle.usd_price(OracleAsset::Sol).await.unwrap(), dec!(100));
        assert_eq!(oracle.usd_price(OracleAsset::Sol).await.unwrap(), dec!(100));
        assert_eq!(oracle.source.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_quote_is_refetched() {
        let oracle = PriceOracle::new(CountingSource::new(dec!(100)), Duration::ZERO);

        oracle.usd_price(OracleAsset::Sol).await.unwrap();
        oracle.usd_price(OracleAsset::Sol).await.unwrap();
        assert_eq!(oracle.source.calls(), 2);
    }

    #[tokio::test]
    async fn test_assets_are_cached_independently() {
        let oracle = PriceOracle::new(CountingSource::new(dec!(3)), FRESHNESS_WINDOW);

        oracle.usd_price(OracleAsset::Sol).await.unwrap();
        oracle.usd_price(OracleAsset::Bark).await.unwrap();
        oracle.usd_price(OracleAsset::Sol).await.unwrap();
        assert_eq!(oracle.source.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_for_every_asset() {
        let oracle = PriceOracle::new(FailingSource, FRESHNESS_WINDOW);

        assert!(oracle.usd_price(OracleAsset::Sol).await.is_err());
        assert!(oracle.usd_price(OracleAsset::Bark).await.is_err());
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        struct FlakySource {
            calls: AtomicU32,
        }

        #[async_trait]
        impl PriceSource for FlakySource {
            async fn fetch_usd_price(&self, _asset: OracleAsset) -> Result<Decimal, OracleError> {
                let n = self.calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(OracleError::Status(500))
                } else {
                    Ok(dec!(42))
                }
            }
        }

        let oracle = PriceOracle::new(
            FlakySource {
                calls: AtomicU32::new(0),
            },
            FRESHNESS_WINDOW,
        );

        assert!(oracle.usd_price(OracleAsset::Bark).await.is_err());
        assert_eq!(oracle.usd_price(OracleAsset::Bark).await.unwrap(), dec!(42));
    }
}
