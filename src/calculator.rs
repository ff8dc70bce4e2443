//! # Final Assembly
//!
//! Combines every category into one [`CalculationResult`]:
//!
//! ```text
//! zakatable = cash + zakatable metals + business + investments
//! net       = max(0, zakatable - deductible liabilities)
//! payable   = net × 2.5%   when net ≥ nisab, else 0
//! ```
//!
//! The computation is pure. Any change to an input means calling [`compute`]
//! again; nothing is carried over between runs.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::liabilities::LiabilityDeclaration;
use crate::madhab::FiqhSchool;
use crate::maal::business::BusinessAssets;
use crate::maal::cash::LiquidCash;
use crate::maal::investments::{InvestmentAssets, InvestmentPolicy};
use crate::maal::precious_metals::MetalDeclaration;
use crate::nisab::{self, NisabInputs};
use crate::pricing::MarketRates;
use crate::traits::{ValuationContext, ZakatableCategory};
use crate::types::{AssetCategory, BreakdownLine, CalculationResult, CalculationStep};

/// Zakat rate on monetary wealth: one fortieth.
pub const ZAKAT_RATE: Decimal = dec!(0.025);

/// Everything the declarant owns, as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetDeclaration {
    pub cash: LiquidCash,
    pub metals: MetalDeclaration,
    pub business: BusinessAssets,
    pub investments: InvestmentAssets,
}

impl AssetDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cash(mut self, cash: LiquidCash) -> Self {
        self.cash = cash;
        self
    }

    pub fn metals(mut self, metals: impl Into<MetalDeclaration>) -> Self {
        self.metals = metals.into();
        self
    }

    pub fn business(mut self, business: BusinessAssets) -> Self {
        self.business = business;
        self
    }

    pub fn investments(mut self, investments: InvestmentAssets) -> Self {
        self.investments = investments;
        self
    }
}

/// Computes Zakat with the default (full value) investment policy.
pub fn compute(
    fiqh: FiqhSchool,
    assets: &AssetDeclaration,
    liabilities: &LiabilityDeclaration,
    rates: &MarketRates,
) -> CalculationResult {
    compute_with_policy(fiqh, assets, liabilities, rates, &InvestmentPolicy::default())
}

/// Computes Zakat, valuing investments with `policy`.
pub fn compute_with_policy(
    fiqh: FiqhSchool,
    assets: &AssetDeclaration,
    liabilities: &LiabilityDeclaration,
    rates: &MarketRates,
    policy: &InvestmentPolicy,
) -> CalculationResult {
    let rates = &rates.floored();
    let ctx = ValuationContext {
        fiqh,
        rates,
        investment_policy: policy,
    };
    let holdings = assets.metals.canonical();

    let cash_total = assets.cash.zakatable_value(&ctx).saturating_add(assets.business.cash_component());
    let metals = holdings.valuation(&ctx);
    let business_total = assets.business.zakatable_value(&ctx);
    let investments_total = assets.investments.zakatable_value(&ctx);

    let zakatable_assets = cash_total
        .saturating_add(metals.zakatable_total())
        .saturating_add(business_total)
        .saturating_add(investments_total);
    let deductible_liabilities = liabilities.deductible(fiqh);
    let net_wealth = (zakatable_assets - deductible_liabilities).max(Decimal::ZERO);

    let nisab = nisab::resolve(
        fiqh,
        rates,
        &NisabInputs {
            mixed_assets: cash_total
                .saturating_add(business_total)
                .saturating_add(assets.investments.gross_value(&ctx)),
            raw_silver: metals.raw_silver,
            raw_gold: metals.raw_gold,
        },
    );

    // A zero price gives a zero nisab; nothing is owed on nothing.
    let is_eligible = net_wealth > Decimal::ZERO && net_wealth >= nisab.applicable;
    let zakat_payable = if is_eligible {
        net_wealth.saturating_mul(ZAKAT_RATE)
    } else {
        Decimal::ZERO
    };

    let mut breakdown: Vec<BreakdownLine> = [
        (AssetCategory::Cash, cash_total),
        (AssetCategory::PreciousMetals, metals.zakatable_total()),
        (AssetCategory::Business, business_total),
        (AssetCategory::Investments, investments_total),
    ]
    .into_iter()
    .filter(|(_, amount)| *amount > Decimal::ZERO)
    .map(|(category, amount)| BreakdownLine::new(category, amount))
    .collect();
    if deductible_liabilities > Decimal::ZERO {
        breakdown.push(BreakdownLine::new(AssetCategory::Liabilities, -deductible_liabilities));
    }

    let mut trace = Vec::new();
    trace.extend(assets.cash.trace_steps(&ctx));
    if assets.business.cash_component() > Decimal::ZERO {
        trace.push(CalculationStep::add("Business Cash", assets.business.cash_component()));
    }
    trace.extend(holdings.trace_steps(&ctx));
    trace.extend(assets.business.trace_steps(&ctx));
    trace.extend(assets.investments.trace_steps(&ctx));
    trace.push(CalculationStep::result("Total Zakatable Assets", zakatable_assets));
    trace.extend(liabilities.trace_steps(fiqh));
    trace.push(CalculationStep::result("Net Wealth", net_wealth));
    trace.push(CalculationStep::compare(
        format!("Nisab Threshold ({} standard)", nisab.standard),
        nisab.applicable,
    ));
    if is_eligible {
        trace.push(CalculationStep::rate("Applied Rate (2.5%)", ZAKAT_RATE));
        trace.push(CalculationStep::result("Zakat Due", zakat_payable));
    } else {
        trace.push(CalculationStep::info("Net wealth below Nisab - No Zakat Due"));
    }

    tracing::debug!(
        %fiqh,
        %zakatable_assets,
        %deductible_liabilities,
        %net_wealth,
        %zakat_payable,
        "zakat computed"
    );

    CalculationResult {
        fiqh,
        zakatable_assets,
        deductible_liabilities,
        net_wealth,
        nisab,
        is_eligible,
        zakat_payable,
        metals,
        breakdown,
        calculation_trace: trace,
    }
}

/// JSON Schema of [`CalculationResult`].
pub fn result_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(CalculationResult)
}

/// JSON Schema of the declaration accepted by [`compute`] and the CLI.
pub fn declaration_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(crate::session::DeclarationFile)
}
