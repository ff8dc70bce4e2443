//! # Fiqh Compliance: Stocks, Crypto & Pensions
//!
//! ## Classification
//! - **Stocks/Crypto**: Classified as *Urud al-Tijarah* (Trade Goods) when held for capital appreciation.
//! - **Passive holdings**: Some scholars only levy the zakatable share of a company's
//!   underlying assets, commonly approximated as 25% of market value.
//! - **Pensions**: Only reachable funds are wealth in hand; locked funds are not.
//!
//! Which fraction applies to which holding is data, held by [`InvestmentPolicy`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::inputs::{IntoZakatDecimal, floor_zero, normalize};
use crate::traits::{ValuationContext, ZakatableCategory};
use crate::types::CalculationStep;

/// Declared trading intent for brokerage holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum StockStrategy {
    /// Long-term holder.
    #[default]
    Passive,
    /// Active trader.
    Trader,
}

/// Whether pension funds can be withdrawn today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum PensionAccess {
    #[default]
    Accessible,
    Locked,
}

/// Investment asset class with its optional tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", tag = "class", content = "tag")]
pub enum InvestmentClass {
    Stocks(Option<StockStrategy>),
    Crypto,
    Pension(Option<PensionAccess>),
}

impl InvestmentClass {
    /// The same class without its tag.
    fn untagged(&self) -> Self {
        match self {
            InvestmentClass::Stocks(_) => InvestmentClass::Stocks(None),
            InvestmentClass::Crypto => InvestmentClass::Crypto,
            InvestmentClass::Pension(_) => InvestmentClass::Pension(None),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            InvestmentClass::Stocks(Some(StockStrategy::Passive)) => "Stocks (passive)",
            InvestmentClass::Stocks(Some(StockStrategy::Trader)) => "Stocks (trader)",
            InvestmentClass::Stocks(None) => "Stocks",
            InvestmentClass::Crypto => "Crypto",
            InvestmentClass::Pension(Some(PensionAccess::Accessible)) => "Pension (accessible)",
            InvestmentClass::Pension(Some(PensionAccess::Locked)) => "Pension (locked)",
            InvestmentClass::Pension(None) => "Pension",
        }
    }
}

/// Mapping from `{asset class, optional tag}` to the zakatable fraction.
///
/// Lookup tries the tagged class first, then the untagged class, then falls
/// back to 100%.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<FractionRow>", into = "Vec<FractionRow>")]
pub struct InvestmentPolicy {
    fractions: BTreeMap<InvestmentClass, Decimal>,
}

/// Serialized form of one policy row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FractionRow {
    pub class: InvestmentClass,
    pub fraction: Decimal,
}

impl From<Vec<FractionRow>> for InvestmentPolicy {
    fn from(rows: Vec<FractionRow>) -> Self {
        rows.into_iter()
            .fold(Self { fractions: BTreeMap::new() }, |policy, row| {
                policy.with_fraction(row.class, row.fraction)
            })
    }
}

impl From<InvestmentPolicy> for Vec<FractionRow> {
    fn from(policy: InvestmentPolicy) -> Self {
        policy
            .fractions
            .into_iter()
            .map(|(class, fraction)| FractionRow { class, fraction })
            .collect()
    }
}

impl Default for InvestmentPolicy {
    fn default() -> Self {
        Self::full_value()
    }
}

impl InvestmentPolicy {
    /// Every investment is zakatable at full market value, whatever its tag.
    pub fn full_value() -> Self {
        Self { fractions: BTreeMap::new() }
            .with_fraction(InvestmentClass::Stocks(None), Decimal::ONE)
            .with_fraction(InvestmentClass::Crypto, Decimal::ONE)
            .with_fraction(InvestmentClass::Pension(None), Decimal::ONE)
    }

    /// Fractions weighted by declared intent and access.
    pub fn intent_weighted() -> Self {
        Self::full_value()
            .with_fraction(InvestmentClass::Stocks(Some(StockStrategy::Passive)), dec!(0.25))
            .with_fraction(InvestmentClass::Stocks(Some(StockStrategy::Trader)), Decimal::ONE)
            .with_fraction(InvestmentClass::Pension(Some(PensionAccess::Accessible)), dec!(0.25))
            .with_fraction(InvestmentClass::Pension(Some(PensionAccess::Locked)), Decimal::ZERO)
    }

    /// Overrides one row. The fraction is clamped to `[0, 1]`.
    pub fn with_fraction(mut self, class: InvestmentClass, fraction: impl IntoZakatDecimal) -> Self {
        let fraction = normalize(fraction).min(Decimal::ONE);
        self.fractions.insert(class, fraction);
        self
    }

    pub fn fraction(&self, class: InvestmentClass) -> Decimal {
        self.fractions
            .get(&class)
            .or_else(|| self.fractions.get(&class.untagged()))
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}

impl JsonSchema for InvestmentPolicy {
    fn schema_name() -> String {
        "InvestmentPolicy".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        <Vec<FractionRow>>::json_schema(generator)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct InvestmentAssets {
    pub stocks_value: Decimal,
    pub stock_strategy: Option<StockStrategy>,
    pub crypto_value: Decimal,
    pub pension_value: Decimal,
    pub pension_access: Option<PensionAccess>,
}

impl InvestmentAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stocks(mut self, value: impl IntoZakatDecimal) -> Self {
        self.stocks_value = normalize(value);
        self
    }

    pub fn strategy(mut self, strategy: StockStrategy) -> Self {
        self.stock_strategy = Some(strategy);
        self
    }

    pub fn crypto(mut self, value: impl IntoZakatDecimal) -> Self {
        self.crypto_value = normalize(value);
        self
    }

    pub fn pension(mut self, value: impl IntoZakatDecimal, access: PensionAccess) -> Self {
        self.pension_value = normalize(value);
        self.pension_access = Some(access);
        self
    }

    fn holdings(&self) -> [(InvestmentClass, Decimal); 3] {
        [
            (InvestmentClass::Stocks(self.stock_strategy), floor_zero(self.stocks_value)),
            (InvestmentClass::Crypto, floor_zero(self.crypto_value)),
            (InvestmentClass::Pension(self.pension_access), floor_zero(self.pension_value)),
        ]
    }
}

impl ZakatableCategory for InvestmentAssets {
    fn gross_value(&self, _ctx: &ValuationContext<'_>) -> Decimal {
        self.holdings()
            .iter()
            .fold(Decimal::ZERO, |acc, (_, v)| acc.saturating_add(*v))
    }

    fn zakatable_value(&self, ctx: &ValuationContext<'_>) -> Decimal {
        self.holdings().iter().fold(Decimal::ZERO, |acc, (class, value)| {
            acc.saturating_add(value.saturating_mul(ctx.investment_policy.fraction(*class)))
        })
    }

    fn trace_steps(&self, ctx: &ValuationContext<'_>) -> Vec<CalculationStep> {
        let mut trace = Vec::new();
        for (class, value) in self.holdings() {
            if value.is_zero() {
                continue;
            }
            let fraction = ctx.investment_policy.fraction(class);
            trace.push(CalculationStep::initial(format!("{} Market Value", class.label()), value));
            if fraction != Decimal::ONE {
                trace.push(CalculationStep::rate(format!("{} Zakatable Fraction", class.label()), fraction));
            }
            trace.push(CalculationStep::add(class.label(), value.saturating_mul(fraction)));
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::madhab::FiqhSchool;
    use crate::pricing::MarketRates;

    fn value_with(policy: &InvestmentPolicy, assets: &InvestmentAssets) -> Decimal {
        let rates = MarketRates::default();
        let ctx = ValuationContext {
            fiqh: FiqhSchool::Hanafi,
            rates: &rates,
            investment_policy: policy,
        };
        assets.zakatable_value(&ctx)
    }

    fn gross(assets: &InvestmentAssets) -> Decimal {
        let rates = MarketRates::default();
        let policy = InvestmentPolicy::intent_weighted();
        let ctx = ValuationContext {
            fiqh: FiqhSchool::Hanafi,
            rates: &rates,
            investment_policy: &policy,
        };
        assets.gross_value(&ctx)
    }

    #[test]
    fn test_full_value_ignores_tags() {
        let assets = InvestmentAssets::new()
            .stocks(10_000)
            .strategy(StockStrategy::Passive)
            .crypto(2_000)
            .pension(4_000, PensionAccess::Locked);
        assert_eq!(value_with(&InvestmentPolicy::full_value(), &assets), dec!(16000));
        assert_eq!(gross(&assets), dec!(16000));
    }

    #[test]
    fn test_intent_weighted_fractions() {
        let policy = InvestmentPolicy::intent_weighted();

        let passive = InvestmentAssets::new().stocks(10_000).strategy(StockStrategy::Passive);
        assert_eq!(value_with(&policy, &passive), dec!(2500));

        let trader = InvestmentAssets::new().stocks(10_000).strategy(StockStrategy::Trader);
        assert_eq!(value_with(&policy, &trader), dec!(10000));

        let pension = InvestmentAssets::new().pension(8_000, PensionAccess::Accessible);
        assert_eq!(value_with(&policy, &pension), dec!(2000));

        let locked = InvestmentAssets::new().pension(8_000, PensionAccess::Locked);
        assert_eq!(value_with(&policy, &locked), Decimal::ZERO);

        let crypto = InvestmentAssets::new().crypto(3_000);
        assert_eq!(value_with(&policy, &crypto), dec!(3000));
    }

    #[test]
    fn test_untagged_falls_back_to_class_row() {
        let policy = InvestmentPolicy::intent_weighted();
        assert_eq!(policy.fraction(InvestmentClass::Stocks(None)), Decimal::ONE);

        let custom = InvestmentPolicy::full_value().with_fraction(InvestmentClass::Stocks(None), dec!(0.4));
        assert_eq!(custom.fraction(InvestmentClass::Stocks(Some(StockStrategy::Trader))), dec!(0.4));
    }

    #[test]
    fn test_fraction_is_clamped() {
        let policy = InvestmentPolicy::full_value()
            .with_fraction(InvestmentClass::Crypto, 3)
            .with_fraction(InvestmentClass::Pension(None), -1);
        assert_eq!(policy.fraction(InvestmentClass::Crypto), Decimal::ONE);
        assert_eq!(policy.fraction(InvestmentClass::Pension(None)), Decimal::ZERO);
    }

    #[test]
    fn test_policy_serializes_as_rows() {
        let policy = InvestmentPolicy::intent_weighted();
        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains(r#""class":"crypto""#));
        let back: InvestmentPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }
}
