//! Pricing module for Zakat calculations.
//!
//! The engine only ever reads [`MarketRates`] held locally. Refreshing them is
//! the job of a [`PriceOracle`], an async collaborator that may block or fail.
//! [`PriceBook`] wraps every oracle call in a timeout and keeps the previous
//! rate whenever a lookup does not succeed, reporting a [`PriceNotice`]
//! instead of an error.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::inputs::{IntoZakatDecimal, floor_zero, normalize};
pub use crate::maal::precious_metals::Metal;
use crate::types::ZakatError;
use std::time::Duration;

/// Default bound on a single oracle lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Gold and silver prices per gram, in the declaration's currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketRates {
    /// Price of one gram of 24K gold.
    pub gold_per_gram: Decimal,
    pub silver_per_gram: Decimal,
    /// Date the prices were observed, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

impl Default for MarketRates {
    fn default() -> Self {
        Self::snapshot()
    }
}

impl MarketRates {
    /// Creates rates from user-entered values; invalid input becomes zero.
    pub fn new(gold_per_gram: impl IntoZakatDecimal, silver_per_gram: impl IntoZakatDecimal) -> Self {
        Self {
            gold_per_gram: normalize(gold_per_gram),
            silver_per_gram: normalize(silver_per_gram),
            as_of: None,
        }
    }

    /// Last-known snapshot (INR per gram, Mumbai, 12 Feb 2026).
    pub fn snapshot() -> Self {
        Self {
            gold_per_gram: dec!(16057.84),
            silver_per_gram: dec!(277.55),
            as_of: NaiveDate::from_ymd_opt(2026, 2, 12),
        }
    }

    pub fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    pub fn price(&self, metal: Metal) -> Decimal {
        match metal {
            Metal::Gold => self.gold_per_gram,
            Metal::Silver => self.silver_per_gram,
        }
    }

    /// Both prices with the non-negative floor re-applied.
    pub(crate) fn floored(&self) -> Self {
        Self {
            gold_per_gram: floor_zero(self.gold_per_gram),
            silver_per_gram: floor_zero(self.silver_per_gram),
            as_of: self.as_of,
        }
    }

    pub fn set_price(&mut self, metal: Metal, price: impl IntoZakatDecimal) {
        let price = normalize(price);
        match metal {
            Metal::Gold => self.gold_per_gram = price,
            Metal::Silver => self.silver_per_gram = price,
        }
    }
}

/// Trait for fetching the current price of one metal in one locality.
///
/// Implementors can fetch prices from various sources:
/// - Static values for testing
/// - A remote rate page ([`RateTableOracle`], feature `live-pricing`)
#[cfg(feature = "async")]
#[async_trait::async_trait]
pub trait PriceOracle: Send + Sync {
    /// Price per gram of `metal` in `locality`.
    ///
    /// Fails with `NotFound` if no rate matches, `Timeout` or `Network` if
    /// the lookup cannot complete.
    async fn fetch_price_per_unit(&self, metal: Metal, locality: &str) -> Result<Decimal, ZakatError>;
}

/// A static oracle for tests, offline mode and user-provided prices.
#[derive(Debug, Clone)]
pub struct StaticPriceOracle {
    rates: MarketRates,
}

impl StaticPriceOracle {
    pub fn new(gold_per_gram: impl IntoZakatDecimal, silver_per_gram: impl IntoZakatDecimal) -> Self {
        Self {
            rates: MarketRates::new(gold_per_gram, silver_per_gram),
        }
    }

    pub fn from_rates(rates: MarketRates) -> Self {
        Self { rates }
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn fetch_price_per_unit(&self, metal: Metal, locality: &str) -> Result<Decimal, ZakatError> {
        let price = self.rates.price(metal);
        if price.is_zero() {
            return Err(ZakatError::NotFound {
                metal: metal.to_string(),
                locality: locality.to_string(),
            });
        }
        Ok(price)
    }
}

/// A non-fatal report that a price could not be refreshed.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceNotice {
    pub metal: Metal,
    pub error: ZakatError,
    /// The price still in use.
    pub kept: Decimal,
}

impl std::fmt::Display for PriceNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not refresh {} price ({}); keeping {:.2}",
            self.metal, self.error, self.kept
        )
    }
}

/// Locally held prices plus the rules for refreshing them.
#[derive(Debug, Clone)]
pub struct PriceBook {
    rates: MarketRates,
    locality: String,
    timeout: Duration,
}

impl PriceBook {
    pub fn new(rates: MarketRates, locality: impl Into<String>) -> Self {
        Self {
            rates,
            locality: locality.into(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rates(&self) -> &MarketRates {
        &self.rates
    }

    pub fn locality(&self) -> &str {
        &self.locality
    }

    /// Manual edit of one price.
    pub fn set_price(&mut self, metal: Metal, price: impl IntoZakatDecimal) {
        self.rates.set_price(metal, price);
    }
}

#[cfg(feature = "async")]
pub use self::oracle::*;

#[cfg(feature = "async")]
mod oracle {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};
    use std::time::Instant;

    /// A decorator that caches prices per `{metal, locality}` for a fixed TTL.
    #[derive(Debug, Clone)]
    pub struct CachedPriceOracle<O> {
        inner: O,
        cache: Arc<RwLock<HashMap<(Metal, String), (Instant, Decimal)>>>,
        ttl: Duration,
    }

    impl<O> CachedPriceOracle<O> {
        pub fn new(inner: O, ttl: Duration) -> Self {
            Self {
                inner,
                cache: Arc::new(RwLock::new(HashMap::new())),
                ttl,
            }
        }
    }

    #[async_trait::async_trait]
    impl<O: PriceOracle> PriceOracle for CachedPriceOracle<O> {
        async fn fetch_price_per_unit(&self, metal: Metal, locality: &str) -> Result<Decimal, ZakatError> {
            let key = (metal, locality.to_lowercase());

            if let Ok(guard) = self.cache.read() {
                if let Some((fetched_at, price)) = guard.get(&key) {
                    if fetched_at.elapsed() < self.ttl {
                        return Ok(*price);
                    }
                }
            }

            let price = self.inner.fetch_price_per_unit(metal, locality).await?;

            if let Ok(mut guard) = self.cache.write() {
                guard.insert(key, (Instant::now(), price));
            }
            Ok(price)
        }
    }

    impl PriceBook {
        /// Looks up one metal, bounded by the book's timeout.
        pub async fn lookup<O: PriceOracle + ?Sized>(&self, oracle: &O, metal: Metal) -> Result<Decimal, ZakatError> {
            let price = tokio::time::timeout(self.timeout, oracle.fetch_price_per_unit(metal, &self.locality))
                .await
                .map_err(|_| ZakatError::Timeout {
                    seconds: self.timeout.as_secs(),
                })??;
            if price <= Decimal::ZERO {
                return Err(ZakatError::NotFound {
                    metal: metal.to_string(),
                    locality: self.locality.clone(),
                });
            }
            Ok(price)
        }

        /// Refreshes both prices concurrently.
        ///
        /// A metal whose lookup fails keeps its previous price and yields a
        /// notice; the book is never left half-written for a single metal.
        pub async fn refresh<O: PriceOracle + ?Sized>(&mut self, oracle: &O) -> Vec<PriceNotice> {
            let (gold, silver) = tokio::join!(self.lookup(oracle, Metal::Gold), self.lookup(oracle, Metal::Silver));

            let mut notices = Vec::new();
            let mut updated = false;
            for (metal, outcome) in [(Metal::Gold, gold), (Metal::Silver, silver)] {
                match outcome {
                    Ok(price) => {
                        tracing::debug!(%metal, %price, locality = %self.locality, "price refreshed");
                        self.rates.set_price(metal, price);
                        updated = true;
                    }
                    Err(error) => {
                        let notice = PriceNotice {
                            metal,
                            kept: self.rates.price(metal),
                            error,
                        };
                        tracing::warn!("{}", notice);
                        notices.push(notice);
                    }
                }
            }
            if updated {
                self.rates.as_of = Some(chrono::Local::now().date_naive());
            }
            notices
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct CountingOracle {
            calls: AtomicUsize,
        }

        #[async_trait::async_trait]
        impl PriceOracle for CountingOracle {
            async fn fetch_price_per_unit(&self, _metal: Metal, _locality: &str) -> Result<Decimal, ZakatError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(dec!(100))
            }
        }

        #[tokio::test]
        async fn test_cached_oracle_reuses_price() {
            let cached = CachedPriceOracle::new(
                CountingOracle {
                    calls: AtomicUsize::new(0),
                },
                Duration::from_secs(60),
            );
            assert_eq!(cached.fetch_price_per_unit(Metal::Gold, "Mumbai").await.unwrap(), dec!(100));
            assert_eq!(cached.fetch_price_per_unit(Metal::Gold, "mumbai").await.unwrap(), dec!(100));
            assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);

            cached.fetch_price_per_unit(Metal::Silver, "mumbai").await.unwrap();
            assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        }

        #[tokio::test]
        async fn test_static_oracle_zero_price_is_not_found() {
            let oracle = StaticPriceOracle::new(6000, 0);
            assert_eq!(oracle.fetch_price_per_unit(Metal::Gold, "x").await.unwrap(), dec!(6000));
            let err = oracle.fetch_price_per_unit(Metal::Silver, "x").await.unwrap_err();
            assert!(matches!(err, ZakatError::NotFound { .. }));
        }

        #[tokio::test]
        async fn test_refresh_updates_both_prices() {
            let mut book = PriceBook::new(MarketRates::snapshot(), "mumbai");
            let notices = book.refresh(&StaticPriceOracle::new(7000, 90)).await;
            assert!(notices.is_empty());
            assert_eq!(book.rates().gold_per_gram, dec!(7000));
            assert_eq!(book.rates().silver_per_gram, dec!(90));
        }

        #[tokio::test]
        async fn test_refresh_keeps_previous_price_on_failure() {
            let mut book = PriceBook::new(MarketRates::snapshot(), "mumbai");
            let notices = book.refresh(&StaticPriceOracle::new(7000, 0)).await;
            assert_eq!(notices.len(), 1);
            assert_eq!(notices[0].metal, Metal::Silver);
            assert_eq!(notices[0].kept, dec!(277.55));
            assert_eq!(book.rates().gold_per_gram, dec!(7000));
            assert_eq!(book.rates().silver_per_gram, dec!(277.55));
        }
    }
}

#[cfg(feature = "live-pricing")]
pub use self::live::{DEFAULT_BASE_URL, RateTableOracle};

#[cfg(feature = "live-pricing")]
mod live {
    use super::*;
    use regex::Regex;
    use std::sync::LazyLock;
    use std::time::Duration;

    static ROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("valid row pattern"));
    static CELL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?is)<t[dh][^>]*>(.*?)</t[dh]>").expect("valid cell pattern"));
    static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag pattern"));

    /// Label of the row carrying the per-gram rate.
    const GRAM_ROW_LABEL: &str = "1 gm";

    /// Default rate site.
    pub const DEFAULT_BASE_URL: &str = "https://www.angelone.in";

    /// Reads the per-gram rate out of a public "rates today" page.
    ///
    /// Requests `{base}/{metal}-rates-today/{metal}-rate-in-{city}` and takes
    /// the second cell of the table row labelled `1 gm`.
    pub struct RateTableOracle {
        client: reqwest::Client,
        base_url: String,
        timeout: Duration,
    }

    impl RateTableOracle {
        pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(concat!("zakat-engine/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "failed to build rate client, using defaults without timeout");
                    reqwest::Client::default()
                });
            Self {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                timeout,
            }
        }

        fn url(&self, metal: Metal, city: &str) -> String {
            format!("{}/{metal}-rates-today/{metal}-rate-in-{city}", self.base_url)
        }
    }

    impl Default for RateTableOracle {
        fn default() -> Self {
            Self::new(DEFAULT_BASE_URL, super::DEFAULT_LOOKUP_TIMEOUT)
        }
    }

    /// City slug as used in rate page URLs.
    fn city_slug(locality: &str) -> String {
        locality
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase()
    }

    /// Extracts the per-gram rate from a rate page.
    pub(crate) fn parse_rate_table(html: &str) -> Option<Decimal> {
        ROW.captures_iter(html).find_map(|row| {
            let cells: Vec<String> = CELL
                .captures_iter(&row[1])
                .map(|cell| TAG.replace_all(&cell[1], "").replace("&nbsp;", " ").trim().to_string())
                .collect();
            if cells.len() > 1 && cells[0].to_lowercase() == GRAM_ROW_LABEL {
                let digits: String = cells[1].chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
                digits.parse::<Decimal>().ok()
            } else {
                None
            }
        })
    }

    #[async_trait::async_trait]
    impl PriceOracle for RateTableOracle {
        async fn fetch_price_per_unit(&self, metal: Metal, locality: &str) -> Result<Decimal, ZakatError> {
            let city = city_slug(locality);
            if city.is_empty() {
                return Err(ZakatError::InvalidInput {
                    field: "locality".to_string(),
                    reason: "City parameter is required".to_string(),
                });
            }

            let url = self.url(metal, &city);
            tracing::debug!(%url, "fetching rate page");

            let transport = |e: reqwest::Error| {
                if e.is_timeout() {
                    ZakatError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    ZakatError::Network(format!("Rate page error: {}", e))
                }
            };

            let response = self.client.get(&url).send().await.map_err(transport)?;
            let not_found = || ZakatError::NotFound {
                metal: metal.to_string(),
                locality: locality.to_string(),
            };
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(not_found());
            }
            let response = response.error_for_status().map_err(transport)?;
            let html = response.text().await.map_err(transport)?;

            parse_rate_table(&html).ok_or_else(not_found)
        }
    }

}
