use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Nisab standard used to benchmark the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
#[serde(rename_all = "camelCase")]
pub enum NisabStandard {
    /// Gold weight × gold price.
    Gold,
    /// Silver weight × silver price.
    Silver,
}

/// Islamic school of jurisprudence (fiqh) selected for the calculation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum FiqhSchool {
    #[default]
    Hanafi,
    #[strum(to_string = "shafii", serialize = "shafi")]
    #[serde(alias = "shafi")]
    Shafii,
    Maliki,
    Hanbali,
    /// The general calculation followed by the majority of schools.
    Unspecified,
}

/// A kind of declared debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum LiabilityKind {
    /// Debts due immediately.
    ImmediateDebt,
    /// Near-term expenses falling due (rent, bills, wages).
    ExpensesDue,
}

/// The rules one school applies, as data.
///
/// Adding a school means adding one row to [`POLICIES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiqhPolicy {
    pub school: FiqhSchool,
    /// Personal-use jewelry is exempt when flagged as such.
    pub jewelry_exempt: bool,
    pub deductible_liabilities: &'static [LiabilityKind],
    pub nisab_silver_grams: Decimal,
    pub nisab_gold_grams: Decimal,
}

impl FiqhPolicy {
    pub fn deducts(&self, kind: LiabilityKind) -> bool {
        self.deductible_liabilities.contains(&kind)
    }
}

const ALL_DEBTS: &[LiabilityKind] = &[LiabilityKind::ImmediateDebt, LiabilityKind::ExpensesDue];
const IMMEDIATE_ONLY: &[LiabilityKind] = &[LiabilityKind::ImmediateDebt];
const NONE: &[LiabilityKind] = &[];

/// Per-school rule table.
pub static POLICIES: [FiqhPolicy; 5] = [
    // Hanafi counts jewelry as growing wealth and uses the heavier classical weights.
    FiqhPolicy {
        school: FiqhSchool::Hanafi,
        jewelry_exempt: false,
        deductible_liabilities: ALL_DEBTS,
        nisab_silver_grams: dec!(612.36),
        nisab_gold_grams: dec!(87.48),
    },
    FiqhPolicy {
        school: FiqhSchool::Shafii,
        jewelry_exempt: true,
        deductible_liabilities: NONE,
        nisab_silver_grams: dec!(595),
        nisab_gold_grams: dec!(85),
    },
    FiqhPolicy {
        school: FiqhSchool::Maliki,
        jewelry_exempt: true,
        deductible_liabilities: IMMEDIATE_ONLY,
        nisab_silver_grams: dec!(595),
        nisab_gold_grams: dec!(85),
    },
    FiqhPolicy {
        school: FiqhSchool::Hanbali,
        jewelry_exempt: true,
        deductible_liabilities: IMMEDIATE_ONLY,
        nisab_silver_grams: dec!(595),
        nisab_gold_grams: dec!(85),
    },
    FiqhPolicy {
        school: FiqhSchool::Unspecified,
        jewelry_exempt: true,
        deductible_liabilities: IMMEDIATE_ONLY,
        nisab_silver_grams: dec!(595),
        nisab_gold_grams: dec!(85),
    },
];

impl FiqhSchool {
    /// Looks up this school's row in the policy table.
    pub fn policy(&self) -> &'static FiqhPolicy {
        // Rows are declared in enum order.
        &POLICIES[*self as usize]
    }

    pub fn is_jewelry_exempt(&self) -> bool {
        self.policy().jewelry_exempt
    }

    /// Title-cased name for printed output ("Shafii", "Unspecified").
    pub fn title(&self) -> &'static str {
        match self {
            FiqhSchool::Hanafi => "Hanafi",
            FiqhSchool::Shafii => "Shafii",
            FiqhSchool::Maliki => "Maliki",
            FiqhSchool::Hanbali => "Hanbali",
            FiqhSchool::Unspecified => "Unspecified",
        }
    }
}
