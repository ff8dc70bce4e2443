use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::madhab::FiqhSchool;
use crate::maal::precious_metals::MetalValuation;
use crate::nisab::NisabThreshold;

/// The kind of arithmetic a trace step represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Initial,
    Add,
    Subtract,
    Compare,
    Rate,
    Result,
    Info,
}

/// Represents a single step in the Zakat calculation process.
///
/// This struct provides transparency into how the final Zakat amount was derived,
/// enabling users to understand and verify each step of the calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculationStep {
    /// Human-readable description of what this step does.
    pub description: String,
    /// The value at this step (if applicable).
    pub amount: Option<Decimal>,
    pub operation: Operation,
}

impl CalculationStep {
    fn new(description: impl Into<String>, amount: Option<Decimal>, operation: Operation) -> Self {
        Self {
            description: description.into(),
            amount,
            operation,
        }
    }

    pub fn initial(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, Some(amount), Operation::Initial)
    }

    pub fn add(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, Some(amount), Operation::Add)
    }

    pub fn subtract(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, Some(amount), Operation::Subtract)
    }

    pub fn compare(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, Some(amount), Operation::Compare)
    }

    pub fn rate(description: impl Into<String>, rate: Decimal) -> Self {
        Self::new(description, Some(rate), Operation::Rate)
    }

    pub fn result(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, Some(amount), Operation::Result)
    }

    pub fn info(description: impl Into<String>) -> Self {
        Self::new(description, None, Operation::Info)
    }
}

/// Categories that can appear on the breakdown, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum AssetCategory {
    Cash,
    PreciousMetals,
    Business,
    Investments,
    Liabilities,
}

impl AssetCategory {
    pub fn label(&self) -> &'static str {
        match self {
            AssetCategory::Cash => "Cash & Savings",
            AssetCategory::PreciousMetals => "Zakatable Gold & Silver",
            AssetCategory::Business => "Business Assets",
            AssetCategory::Investments => "Investments",
            AssetCategory::Liabilities => "Deductible Liabilities",
        }
    }
}

/// One line of the printable breakdown.
///
/// Liabilities appear with a negative `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    pub category: AssetCategory,
    pub label: String,
    pub amount: Decimal,
}

impl BreakdownLine {
    pub fn new(category: AssetCategory, amount: Decimal) -> Self {
        Self {
            category,
            label: category.label().to_string(),
            amount,
        }
    }
}

/// The complete, immutable outcome of one engine run.
///
/// Every field is a deterministic function of the declared inputs; the
/// struct is rebuilt from scratch on each input change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub fiqh: FiqhSchool,
    /// Sum of every category after fiqh exemptions.
    pub zakatable_assets: Decimal,
    /// Liabilities the selected fiqh allows to be deducted.
    pub deductible_liabilities: Decimal,
    /// `max(0, zakatable_assets - deductible_liabilities)`.
    pub net_wealth: Decimal,
    pub nisab: NisabThreshold,
    pub is_eligible: bool,
    pub zakat_payable: Decimal,
    pub metals: MetalValuation,
    /// Strictly-positive categories only, liabilities last as a negative line.
    pub breakdown: Vec<BreakdownLine>,
    pub calculation_trace: Vec<CalculationStep>,
}

impl CalculationResult {
    /// Shorthand for the applicable nisab value.
    pub fn applicable_nisab(&self) -> Decimal {
        self.nisab.applicable
    }

    /// Returns the amount of the breakdown line for `category`, if present.
    pub fn category_amount(&self, category: AssetCategory) -> Option<Decimal> {
        self.breakdown
            .iter()
            .find(|line| line.category == category)
            .map(|line| line.amount)
    }

    /// Returns the Zakat due formatted with 2 decimal places.
    pub fn format_amount(&self) -> String {
        use rust_decimal::RoundingStrategy;
        let rounded = self
            .zakat_payable
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.2}", rounded)
    }

    /// Generates a human-readable explanation of the calculation trace.
    pub fn explain(&self) -> String {
        use std::fmt::Write;
        let mut output = String::new();

        let _ = writeln!(output, "Explanation ({} fiqh):", self.fiqh);
        let _ = writeln!(output, "{:-<50}", "");

        let width = self
            .calculation_trace
            .iter()
            .map(|step| step.description.len())
            .max()
            .unwrap_or(20)
            .max(20);

        for step in &self.calculation_trace {
            let symbol = match step.operation {
                Operation::Add => "+",
                Operation::Subtract => "-",
                Operation::Rate => "x",
                Operation::Result => "=",
                Operation::Compare => "?",
                Operation::Initial | Operation::Info => " ",
            };
            match (step.operation, step.amount) {
                (Operation::Info, _) | (_, None) => {
                    let _ = writeln!(output, "  INFO: {}", step.description);
                }
                (Operation::Rate, Some(amount)) => {
                    let _ = writeln!(output, "  {:<width$} : {} {:>14.3}", step.description, symbol, amount);
                }
                (_, Some(amount)) => {
                    let _ = writeln!(output, "  {:<width$} : {} {:>14.2}", step.description, symbol, amount);
                }
            }
        }

        let _ = writeln!(output, "{:-<50}", "");
        let _ = writeln!(
            output,
            "Status: {}",
            if self.is_eligible { "PAYABLE" } else { "EXEMPT" }
        );
        if self.is_eligible {
            let _ = writeln!(output, "Amount Due: {}", self.format_amount());
        }
        output
    }
}

impl std::fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Fiqh: {}", self.fiqh)?;
        writeln!(f, "Net Wealth: {} | Nisab: {}", self.net_wealth, self.nisab.applicable)?;
        if self.is_eligible {
            write!(f, "Status: PAYABLE ({} due)", self.format_amount())
        } else {
            write!(f, "Status: EXEMPT - Net wealth below Nisab")
        }
    }
}

/// Errors surfaced by the price oracle and configuration loading.
///
/// The engine itself never fails: malformed input is normalized to zero.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ZakatError {
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("No {metal} rate found for '{locality}'")]
    NotFound { metal: String, locality: String },
    #[error("Price lookup timed out after {seconds}s")]
    Timeout { seconds: u64 },
    #[error("Network error: {0}")]
    Network(String),
}

impl ZakatError {
    /// Whether the error came from the price oracle rather than local configuration.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            ZakatError::NotFound { .. } | ZakatError::Timeout { .. } | ZakatError::Network(_)
        )
    }
}
