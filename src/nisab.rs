//! # Fiqh Compliance: Nisab
//!
//! Two thresholds are priced at current market rates:
//! - **Silver standard**: 612.36g (Hanafi) or 595g (other schools) of silver.
//! - **Gold standard**: 87.48g (Hanafi) or 85g (other schools) of gold.
//!
//! Whenever the declarant holds anything besides gold (cash, business assets,
//! investments or silver, judged on raw pre-exemption values) the lower,
//! more inclusive silver standard applies. Only a purely-gold declaration is
//! measured against the gold standard.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::madhab::{FiqhSchool, NisabStandard};
use crate::pricing::MarketRates;

/// Raw (pre-exemption) holdings that decide which standard applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NisabInputs {
    /// Cash, business and investment value combined.
    pub mixed_assets: Decimal,
    pub raw_silver: Decimal,
    pub raw_gold: Decimal,
}

impl NisabInputs {
    pub fn has_mixed_assets(&self) -> bool {
        self.mixed_assets.saturating_add(self.raw_silver) > Decimal::ZERO
    }
}

/// The applicable threshold together with both components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NisabThreshold {
    pub applicable: Decimal,
    pub standard: NisabStandard,
    pub silver_standard: Decimal,
    pub gold_standard: Decimal,
}

/// Resolves the nisab for a declaration.
pub fn resolve(fiqh: FiqhSchool, rates: &MarketRates, inputs: &NisabInputs) -> NisabThreshold {
    let policy = fiqh.policy();
    let silver_standard = policy.nisab_silver_grams.saturating_mul(rates.silver_per_gram);
    let gold_standard = policy.nisab_gold_grams.saturating_mul(rates.gold_per_gram);

    let standard = if inputs.has_mixed_assets() {
        NisabStandard::Silver
    } else if inputs.raw_gold > Decimal::ZERO {
        NisabStandard::Gold
    } else {
        NisabStandard::Silver
    };

    let applicable = match standard {
        NisabStandard::Gold => gold_standard,
        NisabStandard::Silver => silver_standard,
    };

    tracing::debug!(%fiqh, %standard, %applicable, "nisab resolved");

    NisabThreshold {
        applicable,
        standard,
        silver_standard,
        gold_standard,
    }
}
