//! Printable assessment summary.
//!
//! Currency only affects display; amounts are never converted.

use fixed_decimal::FixedDecimal;
use icu::decimal::FixedDecimalFormatter;
use icu::decimal::options::FixedDecimalFormatterOptions;
use icu::locid::{Locale, locale};
use rust_decimal::{Decimal, RoundingStrategy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};
use writeable::Writeable;

use crate::madhab::{FiqhSchool, NisabStandard};
use crate::pricing::MarketRates;
use crate::types::{BreakdownLine, CalculationResult};

/// Display currency of a declaration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Currency {
    #[default]
    Inr,
    Usd,
    Gbp,
    Eur,
    Aed,
    Sar,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
            Currency::Gbp => "£",
            Currency::Eur => "€",
            Currency::Aed => "د.إ",
            Currency::Sar => "﷼",
        }
    }

    /// Locale whose digit grouping amounts in this currency are printed with.
    pub fn locale(&self) -> Locale {
        match self {
            Currency::Inr => locale!("en-IN"),
            Currency::Gbp => locale!("en-GB"),
            Currency::Aed => locale!("en-AE"),
            Currency::Usd | Currency::Eur | Currency::Sar => locale!("en"),
        }
    }
}

/// Symbol for an ISO currency code; unknown codes display as `$`.
pub fn currency_symbol(code: &str) -> &'static str {
    code.trim().parse::<Currency>().map(|c| c.symbol()).unwrap_or("$")
}

/// Formats `amount` with `en` digit grouping and `dp` decimal places.
pub fn format_money(amount: Decimal, dp: u32) -> String {
    format_money_in(amount, dp, &locale!("en"))
}

/// Formats `amount` with the digit grouping of `locale`, e.g. `12,34,567.00`
/// under `en-IN`.
pub fn format_money_in(amount: Decimal, dp: u32, locale: &Locale) -> String {
    let mut rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    let plain = format!("{:.*}", dp as usize, rounded);
    let mut fixed = FixedDecimal::from_str(&plain).unwrap_or_else(|_| FixedDecimal::from(0));
    fixed.pad_end(-(dp as i16));

    match FixedDecimalFormatter::try_new(&locale.into(), FixedDecimalFormatterOptions::default()) {
        Ok(formatter) => formatter.format(&fixed).write_to_string().into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, %locale, "no decimal formatting data, printing plain digits");
            plain
        }
    }
}

/// Everything the printed assessment shows, in print order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZakatSummary {
    pub fiqh: FiqhSchool,
    pub currency: Currency,
    pub gold_per_gram: Decimal,
    pub silver_per_gram: Decimal,
    pub breakdown: Vec<BreakdownLine>,
    pub zakatable_assets: Decimal,
    pub deductible_liabilities: Decimal,
    pub net_wealth: Decimal,
    pub nisab: Decimal,
    pub nisab_standard: NisabStandard,
    pub is_eligible: bool,
    pub zakat_payable: Decimal,
}

impl ZakatSummary {
    pub fn new(result: &CalculationResult, rates: &MarketRates, currency: Currency) -> Self {
        Self {
            fiqh: result.fiqh,
            currency,
            gold_per_gram: rates.gold_per_gram,
            silver_per_gram: rates.silver_per_gram,
            breakdown: result.breakdown.clone(),
            zakatable_assets: result.zakatable_assets,
            deductible_liabilities: result.deductible_liabilities,
            net_wealth: result.net_wealth,
            nisab: result.nisab.applicable,
            nisab_standard: result.nisab.standard,
            is_eligible: result.is_eligible,
            zakat_payable: result.zakat_payable,
        }
    }

    pub fn status(&self) -> &'static str {
        if self.is_eligible { "Zakat is Obligatory" } else { "Below Nisab" }
    }

    /// `₹ 1,23,456.50` style rendering, grouped for the display currency.
    pub fn money(&self, amount: Decimal) -> String {
        format!(
            "{} {}",
            self.currency.symbol(),
            format_money_in(amount, 2, &self.currency.locale())
        )
    }

    /// Label/value rows in print order, shared by text and table renderers.
    pub fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("Fiqh".to_string(), self.fiqh.title().to_string()),
            ("Currency".to_string(), self.currency.to_string()),
            ("Gold Price".to_string(), format!("{}/g", self.money(self.gold_per_gram))),
            ("Silver Price".to_string(), format!("{}/g", self.money(self.silver_per_gram))),
        ];
        rows.extend(
            self.breakdown
                .iter()
                .map(|line| (line.label.clone(), self.money(line.amount))),
        );
        rows.push(("Zakatable Assets".to_string(), self.money(self.zakatable_assets)));
        rows.push((
            "Deductible Liabilities".to_string(),
            self.money(-self.deductible_liabilities),
        ));
        rows.push(("Net Wealth".to_string(), self.money(self.net_wealth)));
        rows.push((
            format!("Nisab ({} standard)", self.nisab_standard),
            self.money(self.nisab),
        ));
        rows.push(("Status".to_string(), self.status().to_string()));
        rows.push(("Zakat Payable".to_string(), self.money(self.zakat_payable)));
        rows
    }
}

impl fmt::Display for ZakatSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
        writeln!(f, "Zakat Assessment")?;
        writeln!(f, "{:=<40}", "")?;
        for (label, value) in rows {
            writeln!(f, "{:<width$}  {}", label, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_symbols() {
        assert_eq!(currency_symbol("INR"), "₹");
        assert_eq!(currency_symbol("usd"), "$");
        assert_eq!(currency_symbol("GBP"), "£");
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("AED"), "د.إ");
        assert_eq!(currency_symbol("SAR"), "﷼");
        assert_eq!(currency_symbol("JPY"), "$");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(1234567.891), 2), "1,234,567.89");
        assert_eq!(format_money(dec!(999), 2), "999.00");
        assert_eq!(format_money(dec!(-1500), 0), "-1,500");
        assert_eq!(format_money(Decimal::ZERO, 2), "0.00");
    }

    #[test]
    fn test_rupees_use_indian_grouping() {
        let en_in = Currency::Inr.locale();
        assert_eq!(format_money_in(dec!(123456), 0, &en_in), "1,23,456");
        assert_eq!(format_money_in(dec!(1234567.891), 2, &en_in), "12,34,567.89");
        assert_eq!(format_money_in(dec!(1234567.891), 2, &Currency::Usd.locale()), "1,234,567.89");
    }

    #[test]
    fn test_summary_money_follows_currency() {
        let result = crate::calculator::compute(
            FiqhSchool::Hanafi,
            &crate::calculator::AssetDeclaration::new()
                .cash(crate::maal::cash::LiquidCash::new().in_hand(400_000)),
            &crate::liabilities::LiabilityDeclaration::new(),
            &MarketRates::new(6000, 80),
        );
        let rupees = ZakatSummary::new(&result, &MarketRates::new(6000, 80), Currency::Inr);
        assert_eq!(rupees.money(rupees.zakatable_assets), "₹ 4,00,000.00");
        let dollars = ZakatSummary::new(&result, &MarketRates::new(6000, 80), Currency::Usd);
        assert_eq!(dollars.money(dollars.zakatable_assets), "$ 400,000.00");
    }

    #[test]
    fn test_currency_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::Aed).unwrap(), r#""AED""#);
        assert_eq!(Currency::Gbp.to_string(), "GBP");
    }
}
