//! Persistent CLI Configuration Loader
//!
//! Defaults are read from `~/.config/zakat/config.toml` on Linux,
//! `~/Library/Application Support/zakat/config.toml` on macOS or
//! `%APPDATA%\zakat\config.toml` on Windows, then layered under the
//! command-line flags.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

use zakat_engine::prelude::*;

/// CLI Configuration structure loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliConfig {
    /// Default gold price per gram.
    pub gold_price: Option<Decimal>,
    /// Default silver price per gram.
    pub silver_price: Option<Decimal>,
    /// Display currency code (e.g., "INR", "USD").
    pub currency: Option<String>,
    /// Preferred fiqh ("hanafi", "shafii", "maliki", "hanbali", "unspecified").
    pub fiqh: Option<String>,
    /// City used for live rate lookups.
    pub locality: Option<String>,
    /// Investment policy ("full" or "intent").
    pub investment_policy: Option<String>,
    /// Oracle timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Enable file logging by default.
    pub enable_logging: Option<bool>,
    /// Offline mode by default.
    pub offline: Option<bool>,
}

impl CliConfig {
    /// Returns the platform-specific configuration directory.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("zakat"))
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Loads the config file, or `CliConfig::default()` if it is missing or
    /// fails to parse.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            debug!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            debug!("No config file found at {:?}", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!("Failed to parse config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Saves the current configuration to the default config file location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "Could not determine config directory")
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(&path, content)?;
        debug!("Saved configuration to {:?}", path);
        Ok(path)
    }

    /// Writes a sample configuration file at the default location.
    pub fn create_sample() -> Result<PathBuf, std::io::Error> {
        let sample = CliConfig {
            gold_price: Some(Decimal::new(1605784, 2)),
            silver_price: Some(Decimal::new(27755, 2)),
            currency: Some("INR".to_string()),
            fiqh: Some("hanafi".to_string()),
            locality: Some("Mumbai".to_string()),
            investment_policy: Some("full".to_string()),
            timeout_secs: Some(15),
            enable_logging: Some(false),
            offline: Some(false),
        };
        sample.save()
    }

    /// Layers this file over `config`. Unrecognized values are logged and skipped.
    pub fn apply(&self, mut config: ZakatConfig) -> ZakatConfig {
        if let Some(price) = self.gold_price {
            config.rates.set_price(Metal::Gold, price);
        }
        if let Some(price) = self.silver_price {
            config.rates.set_price(Metal::Silver, price);
        }
        if let Some(code) = &self.currency {
            match code.parse::<Currency>() {
                Ok(currency) => config.currency = currency,
                Err(_) => warn!("Unknown currency '{}' in config file", code),
            }
        }
        if let Some(name) = &self.fiqh {
            match name.parse::<FiqhSchool>() {
                Ok(fiqh) => config.fiqh = fiqh,
                Err(_) => warn!("Unknown fiqh '{}' in config file", name),
            }
        }
        if let Some(locality) = &self.locality {
            config.locality = locality.clone();
        }
        if let Some(policy) = &self.investment_policy {
            match policy_by_name(policy) {
                Some(policy) => config.investment_policy = policy,
                None => warn!("Unknown investment policy '{}' in config file", policy),
            }
        }
        if let Some(secs) = self.timeout_secs.filter(|s| *s > 0) {
            config.oracle_timeout_secs = secs;
        }
        config
    }
}

/// Named investment policy presets.
pub fn policy_by_name(name: &str) -> Option<InvestmentPolicy> {
    match name.trim().to_lowercase().as_str() {
        "full" | "full-value" => Some(InvestmentPolicy::full_value()),
        "intent" | "intent-weighted" => Some(InvestmentPolicy::intent_weighted()),
        _ => None,
    }
}
