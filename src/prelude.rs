//! Prelude module for zakat-engine
//!
//! Re-exports the types needed to declare wealth and run a calculation.
//!
//! # Usage
//!
//! ```rust
//! use zakat_engine::prelude::*;
//! ```

// Core exports
pub use crate::calculator::{AssetDeclaration, ZAKAT_RATE, compute, compute_with_policy};
pub use crate::config::ZakatConfig;
pub use crate::inputs::{IntoZakatDecimal, normalize};
pub use crate::liabilities::LiabilityDeclaration;
pub use crate::madhab::{FiqhSchool, NisabStandard};
pub use crate::nisab::NisabThreshold;
pub use crate::report::{Currency, ZakatSummary};
pub use crate::session::{DeclarationFile, ZakatSession};
pub use crate::traits::ZakatableCategory;
pub use crate::types::{AssetCategory, BreakdownLine, CalculationResult, CalculationStep, ZakatError};

// Asset categories
pub use crate::maal::business::BusinessAssets;
pub use crate::maal::cash::LiquidCash;
pub use crate::maal::investments::{InvestmentAssets, InvestmentClass, InvestmentPolicy, PensionAccess, StockStrategy};
pub use crate::maal::precious_metals::{KaratItem, Metal, MetalDeclaration, MetalHoldings, MetalItem, MetalUsage};

// Pricing
pub use crate::pricing::{MarketRates, PriceBook, PriceNotice, StaticPriceOracle};
#[cfg(feature = "async")]
pub use crate::pricing::{CachedPriceOracle, PriceOracle};
#[cfg(feature = "live-pricing")]
pub use crate::pricing::RateTableOracle;
