use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::inputs::IntoZakatDecimal;
use crate::madhab::FiqhSchool;
use crate::maal::investments::InvestmentPolicy;
use crate::pricing::{DEFAULT_LOOKUP_TIMEOUT, MarketRates, PriceBook};
use crate::report::Currency;
use crate::types::ZakatError;

/// Default locality for price lookups.
pub const DEFAULT_LOCALITY: &str = "Mumbai";

/// Engine configuration: everything about a calculation that is not the
/// declaration itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ZakatConfig {
    pub fiqh: FiqhSchool,
    pub currency: Currency,
    pub rates: MarketRates,
    pub investment_policy: InvestmentPolicy,
    /// City used for live price lookups.
    pub locality: String,
    pub oracle_timeout_secs: u64,
}

impl Default for ZakatConfig {
    fn default() -> Self {
        ZakatConfig {
            fiqh: FiqhSchool::default(),
            currency: Currency::default(),
            rates: MarketRates::default(),
            investment_policy: InvestmentPolicy::default(),
            locality: DEFAULT_LOCALITY.to_string(),
            oracle_timeout_secs: DEFAULT_LOOKUP_TIMEOUT.as_secs(),
        }
    }
}

impl std::str::FromStr for ZakatConfig {
    type Err = ZakatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: ZakatConfig = serde_json::from_str(s)
            .map_err(|e| ZakatError::Configuration(format!("Failed to parse config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

impl ZakatConfig {
    pub fn new(gold_price: impl IntoZakatDecimal, silver_price: impl IntoZakatDecimal) -> Result<Self, ZakatError> {
        let gold = gold_price.into_zakat_decimal()?;
        let silver = silver_price.into_zakat_decimal()?;

        let config = Self {
            rates: MarketRates {
                gold_per_gram: gold,
                silver_per_gram: silver,
                as_of: None,
            },
            ..Default::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for logical consistency.
    pub fn validate(&self) -> Result<(), ZakatError> {
        if self.rates.gold_per_gram < Decimal::ZERO {
            return Err(ZakatError::Configuration("Gold price must be non-negative".to_string()));
        }
        if self.rates.silver_per_gram < Decimal::ZERO {
            return Err(ZakatError::Configuration("Silver price must be non-negative".to_string()));
        }
        if self.oracle_timeout_secs == 0 {
            return Err(ZakatError::Configuration("Oracle timeout must be at least 1 second".to_string()));
        }
        Ok(())
    }

    /// Loads configuration from environment variables.
    ///
    /// `ZAKAT_GOLD_PRICE` and `ZAKAT_SILVER_PRICE` are required;
    /// `ZAKAT_FIQH` and `ZAKAT_LOCALITY` are optional.
    pub fn from_env() -> Result<Self, ZakatError> {
        let gold_str = env::var("ZAKAT_GOLD_PRICE")
            .map_err(|_| ZakatError::Configuration("ZAKAT_GOLD_PRICE env var not set".to_string()))?;
        let silver_str = env::var("ZAKAT_SILVER_PRICE")
            .map_err(|_| ZakatError::Configuration("ZAKAT_SILVER_PRICE env var not set".to_string()))?;

        let gold_price = gold_str
            .trim()
            .parse::<Decimal>()
            .map_err(|e| ZakatError::Configuration(format!("Invalid gold price format: {}", e)))?;
        let silver_price = silver_str
            .trim()
            .parse::<Decimal>()
            .map_err(|e| ZakatError::Configuration(format!("Invalid silver price format: {}", e)))?;

        let mut config = Self::new(gold_price, silver_price)?;

        if let Ok(fiqh) = env::var("ZAKAT_FIQH") {
            config.fiqh = fiqh
                .trim()
                .parse()
                .map_err(|_| ZakatError::Configuration(format!("Unknown fiqh '{}'", fiqh)))?;
        }
        if let Ok(locality) = env::var("ZAKAT_LOCALITY") {
            config.locality = locality;
        }
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn try_from_json(path: impl AsRef<Path>) -> Result<Self, ZakatError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ZakatError::Configuration(format!("Failed to read config file: {}", e)))?;
        content.parse()
    }

    pub fn with_fiqh(mut self, fiqh: FiqhSchool) -> Self {
        self.fiqh = fiqh;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = locality.into();
        self
    }

    pub fn with_investment_policy(mut self, policy: InvestmentPolicy) -> Self {
        self.investment_policy = policy;
        self
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// A price book seeded with this configuration's rates.
    pub fn price_book(&self) -> PriceBook {
        PriceBook::new(self.rates.clone(), self.locality.clone()).with_timeout(self.oracle_timeout())
    }
}

/// JSON Schema of [`ZakatConfig`].
pub fn config_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(ZakatConfig)
}
