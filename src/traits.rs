use rust_decimal::Decimal;

use crate::madhab::FiqhSchool;
use crate::maal::investments::InvestmentPolicy;
use crate::pricing::MarketRates;
use crate::types::CalculationStep;

/// Everything a category needs to value itself for one engine run.
#[derive(Debug, Clone, Copy)]
pub struct ValuationContext<'a> {
    pub fiqh: FiqhSchool,
    pub rates: &'a MarketRates,
    pub investment_policy: &'a InvestmentPolicy,
}

/// Trait implemented by every monetary asset category of a declaration.
pub trait ZakatableCategory {
    /// Declared value before any policy fraction or exemption.
    ///
    /// Feeds the mixed-asset check of the nisab resolver.
    fn gross_value(&self, ctx: &ValuationContext<'_>) -> Decimal;

    /// Value that enters the zakatable total.
    fn zakatable_value(&self, ctx: &ValuationContext<'_>) -> Decimal;

    /// Trace lines describing how [`Self::zakatable_value`] was reached.
    fn trace_steps(&self, ctx: &ValuationContext<'_>) -> Vec<CalculationStep>;
}
