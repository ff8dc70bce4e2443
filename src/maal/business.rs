//! # Fiqh Compliance: Business Assets
//!
//! - Trade goods (*Urud al-Tijarah*) are valued at current market value.
//! - Receivables expected to be collected are counted with the trader's wealth.
//! - Business cash is money like any other and is reported on the cash line.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::inputs::{IntoZakatDecimal, floor_zero, normalize};
use crate::traits::{ValuationContext, ZakatableCategory};
use crate::types::CalculationStep;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessAssets {
    /// Inventory / stock-in-trade at market value.
    pub inventory: Decimal,
    pub business_cash: Decimal,
    pub receivables: Decimal,
}

impl BusinessAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inventory(mut self, value: impl IntoZakatDecimal) -> Self {
        self.inventory = normalize(value);
        self
    }

    pub fn cash(mut self, value: impl IntoZakatDecimal) -> Self {
        self.business_cash = normalize(value);
        self
    }

    pub fn receivables(mut self, value: impl IntoZakatDecimal) -> Self {
        self.receivables = normalize(value);
        self
    }

    /// Cash held by the business; joins the cash line of the breakdown.
    pub fn cash_component(&self) -> Decimal {
        floor_zero(self.business_cash)
    }

    /// Inventory plus receivables.
    pub fn trade_component(&self) -> Decimal {
        floor_zero(self.inventory).saturating_add(floor_zero(self.receivables))
    }
}

impl ZakatableCategory for BusinessAssets {
    fn gross_value(&self, _ctx: &ValuationContext<'_>) -> Decimal {
        self.trade_component()
    }

    fn zakatable_value(&self, _ctx: &ValuationContext<'_>) -> Decimal {
        self.trade_component()
    }

    fn trace_steps(&self, _ctx: &ValuationContext<'_>) -> Vec<CalculationStep> {
        let mut trace = Vec::new();
        if self.inventory > Decimal::ZERO {
            trace.push(CalculationStep::add("Business Inventory", self.inventory));
        }
        if self.receivables > Decimal::ZERO {
            trace.push(CalculationStep::add("Receivables", self.receivables));
        }
        trace
    }
}
