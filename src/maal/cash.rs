use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::inputs::{IntoZakatDecimal, floor_zero, normalize};
use crate::traits::{ValuationContext, ZakatableCategory};
use crate::types::CalculationStep;

/// Liquid money held by the declarant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LiquidCash {
    pub cash_in_hand: Decimal,
    pub bank_deposits: Decimal,
    pub digital_wallets: Decimal,
}

impl LiquidCash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_hand(mut self, value: impl IntoZakatDecimal) -> Self {
        self.cash_in_hand = normalize(value);
        self
    }

    pub fn bank(mut self, value: impl IntoZakatDecimal) -> Self {
        self.bank_deposits = normalize(value);
        self
    }

    pub fn wallets(mut self, value: impl IntoZakatDecimal) -> Self {
        self.digital_wallets = normalize(value);
        self
    }

    pub fn total(&self) -> Decimal {
        floor_zero(self.cash_in_hand)
            .saturating_add(floor_zero(self.bank_deposits))
            .saturating_add(floor_zero(self.digital_wallets))
    }
}

impl ZakatableCategory for LiquidCash {
    fn gross_value(&self, _ctx: &ValuationContext<'_>) -> Decimal {
        self.total()
    }

    fn zakatable_value(&self, _ctx: &ValuationContext<'_>) -> Decimal {
        self.total()
    }

    fn trace_steps(&self, _ctx: &ValuationContext<'_>) -> Vec<CalculationStep> {
        [
            ("Cash in Hand", self.cash_in_hand),
            ("Bank Deposits", self.bank_deposits),
            ("Digital Wallets", self.digital_wallets),
        ]
        .into_iter()
        .filter(|(_, v)| *v > Decimal::ZERO)
        .map(|(label, v)| CalculationStep::add(label, v))
        .collect()
    }
}
