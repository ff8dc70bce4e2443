use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::inputs::{IntoZakatDecimal, floor_zero, normalize};
use crate::madhab::{FiqhSchool, LiabilityKind};
use crate::types::CalculationStep;

/// Debts declared against the zakatable base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LiabilityDeclaration {
    pub immediate_debts: Decimal,
    pub expenses_due: Decimal,
}

impl LiabilityDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debts(mut self, value: impl IntoZakatDecimal) -> Self {
        self.immediate_debts = normalize(value);
        self
    }

    pub fn expenses(mut self, value: impl IntoZakatDecimal) -> Self {
        self.expenses_due = normalize(value);
        self
    }

    pub fn amount(&self, kind: LiabilityKind) -> Decimal {
        match kind {
            LiabilityKind::ImmediateDebt => floor_zero(self.immediate_debts),
            LiabilityKind::ExpensesDue => floor_zero(self.expenses_due),
        }
    }

    /// Sum of the liabilities `fiqh` allows to be deducted.
    pub fn deductible(&self, fiqh: FiqhSchool) -> Decimal {
        fiqh.policy()
            .deductible_liabilities
            .iter()
            .fold(Decimal::ZERO, |acc, kind| acc.saturating_add(self.amount(*kind)))
    }

    pub(crate) fn trace_steps(&self, fiqh: FiqhSchool) -> Vec<CalculationStep> {
        let policy = fiqh.policy();
        let mut trace = Vec::new();
        for (kind, label) in [
            (LiabilityKind::ImmediateDebt, "Immediate Debts"),
            (LiabilityKind::ExpensesDue, "Expenses Due"),
        ] {
            let amount = self.amount(kind);
            if amount.is_zero() {
                continue;
            }
            if policy.deducts(kind) {
                trace.push(CalculationStep::subtract(label, amount));
            } else {
                trace.push(CalculationStep::info(format!(
                    "{} of {:.2} not deductible under {} fiqh",
                    label,
                    amount,
                    fiqh.title()
                )));
            }
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deductible_per_school() {
        let liabilities = LiabilityDeclaration::new().debts(1_000).expenses(400);
        assert_eq!(liabilities.deductible(FiqhSchool::Hanafi), dec!(1400));
        assert_eq!(liabilities.deductible(FiqhSchool::Shafii), Decimal::ZERO);
        assert_eq!(liabilities.deductible(FiqhSchool::Maliki), dec!(1000));
        assert_eq!(liabilities.deductible(FiqhSchool::Hanbali), dec!(1000));
        assert_eq!(liabilities.deductible(FiqhSchool::Unspecified), dec!(1000));
    }

    #[test]
    fn test_trace_marks_non_deductible() {
        let liabilities = LiabilityDeclaration::new().debts(500);
        let trace = liabilities.trace_steps(FiqhSchool::Shafii);
        assert_eq!(trace.len(), 1);
        assert!(trace[0].description.contains("not deductible under Shafii"));
    }
}
