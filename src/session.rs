//! A long-lived calculation session.
//!
//! Holds the current fiqh, declaration, liabilities and prices. Every change
//! recomputes the result in full; results are cached on exact input equality,
//! so flipping a setting back and forth does not redo the work.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::calculator::{AssetDeclaration, compute_with_policy};
use crate::config::ZakatConfig;
use crate::inputs::IntoZakatDecimal;
use crate::liabilities::LiabilityDeclaration;
use crate::madhab::FiqhSchool;
use crate::maal::investments::InvestmentPolicy;
use crate::pricing::{MarketRates, Metal, PriceBook};
use crate::report::{Currency, ZakatSummary};
use crate::types::{CalculationResult, ZakatError};

/// Results kept before the cache is cleared.
const CACHE_CAPACITY: usize = 64;

/// A complete declaration as stored on disk or sent over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DeclarationFile {
    pub fiqh: Option<FiqhSchool>,
    pub currency: Option<Currency>,
    pub assets: AssetDeclaration,
    pub liabilities: LiabilityDeclaration,
    /// Overrides the configured market rates.
    pub rates: Option<MarketRates>,
    pub investment_policy: Option<InvestmentPolicy>,
}

impl DeclarationFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ZakatError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ZakatError::Configuration(format!("Failed to read declaration: {}", e)))?;
        content.parse()
    }
}

impl std::str::FromStr for DeclarationFile {
    type Err = ZakatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|e| ZakatError::InvalidInput {
            field: "declaration".to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionInputs {
    fiqh: FiqhSchool,
    assets: AssetDeclaration,
    liabilities: LiabilityDeclaration,
    rates: MarketRates,
    policy: InvestmentPolicy,
}

impl SessionInputs {
    fn compute(&self) -> CalculationResult {
        compute_with_policy(self.fiqh, &self.assets, &self.liabilities, &self.rates, &self.policy)
    }
}

/// Recompute-on-change calculation state.
#[derive(Debug, Clone)]
pub struct ZakatSession {
    inputs: SessionInputs,
    currency: Currency,
    prices: PriceBook,
    result: CalculationResult,
    cache: HashMap<SessionInputs, CalculationResult>,
    computations: usize,
}

impl Default for ZakatSession {
    fn default() -> Self {
        Self::new(&ZakatConfig::default())
    }
}

impl ZakatSession {
    pub fn new(config: &ZakatConfig) -> Self {
        let inputs = SessionInputs {
            fiqh: config.fiqh,
            assets: AssetDeclaration::default(),
            liabilities: LiabilityDeclaration::default(),
            rates: config.rates.clone(),
            policy: config.investment_policy.clone(),
        };
        let result = inputs.compute();
        let mut cache = HashMap::new();
        cache.insert(inputs.clone(), result.clone());
        Self {
            inputs,
            currency: config.currency,
            prices: config.price_book(),
            result,
            cache,
            computations: 1,
        }
    }

    /// Starts a session from a declaration file, layered over `config`.
    pub fn from_declaration(config: &ZakatConfig, file: DeclarationFile) -> Self {
        let mut session = Self::new(config);
        if let Some(currency) = file.currency {
            session.currency = currency;
        }
        if let Some(rates) = file.rates {
            session.prices = PriceBook::new(rates.floored(), config.locality.clone()).with_timeout(config.oracle_timeout());
        }
        session.inputs.fiqh = file.fiqh.unwrap_or(config.fiqh);
        session.inputs.assets = file.assets;
        session.inputs.liabilities = file.liabilities;
        if let Some(policy) = file.investment_policy {
            session.inputs.policy = policy;
        }
        session.recompute();
        session
    }

    pub fn result(&self) -> &CalculationResult {
        &self.result
    }

    pub fn fiqh(&self) -> FiqhSchool {
        self.inputs.fiqh
    }

    pub fn assets(&self) -> &AssetDeclaration {
        &self.inputs.assets
    }

    pub fn liabilities(&self) -> &LiabilityDeclaration {
        &self.inputs.liabilities
    }

    pub fn rates(&self) -> &MarketRates {
        self.prices.rates()
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Number of full engine runs so far; cache hits do not count.
    pub fn computations(&self) -> usize {
        self.computations
    }

    pub fn summary(&self) -> ZakatSummary {
        ZakatSummary::new(&self.result, self.prices.rates(), self.currency)
    }

    pub fn set_fiqh(&mut self, fiqh: FiqhSchool) -> &CalculationResult {
        self.inputs.fiqh = fiqh;
        self.recompute()
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.currency = currency;
    }

    pub fn set_assets(&mut self, assets: AssetDeclaration) -> &CalculationResult {
        self.inputs.assets = assets;
        self.recompute()
    }

    /// Edits the declaration in place.
    pub fn update_assets(&mut self, edit: impl FnOnce(&mut AssetDeclaration)) -> &CalculationResult {
        edit(&mut self.inputs.assets);
        self.recompute()
    }

    pub fn set_liabilities(&mut self, liabilities: LiabilityDeclaration) -> &CalculationResult {
        self.inputs.liabilities = liabilities;
        self.recompute()
    }

    pub fn set_investment_policy(&mut self, policy: InvestmentPolicy) -> &CalculationResult {
        self.inputs.policy = policy;
        self.recompute()
    }

    /// Manual price edit.
    pub fn set_price(&mut self, metal: Metal, price: impl IntoZakatDecimal) -> &CalculationResult {
        self.prices.set_price(metal, price);
        self.recompute()
    }

    /// Refreshes prices from `oracle`, keeping the old rate for any metal
    /// whose lookup fails or times out.
    #[cfg(feature = "async")]
    pub async fn refresh_prices<O: crate::pricing::PriceOracle + ?Sized>(
        &mut self,
        oracle: &O,
    ) -> Vec<crate::pricing::PriceNotice> {
        let notices = self.prices.refresh(oracle).await;
        self.recompute();
        notices
    }

    fn recompute(&mut self) -> &CalculationResult {
        self.inputs.rates = self.prices.rates().clone();

        if let Some(cached) = self.cache.get(&self.inputs) {
            tracing::debug!("session inputs unchanged, reusing cached result");
            self.result = cached.clone();
            return &self.result;
        }

        let result = self.inputs.compute();
        self.computations += 1;
        tracing::info!(
            fiqh = %result.fiqh,
            net_wealth = %result.net_wealth,
            nisab = %result.nisab.applicable,
            payable = %result.zakat_payable,
            "zakat recalculated"
        );

        if self.cache.len() >= CACHE_CAPACITY {
            self.cache.clear();
        }
        self.cache.insert(self.inputs.clone(), result.clone());
        self.result = result;
        &self.result
    }
}
