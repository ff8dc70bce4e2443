//! # zakat-engine
//!
//! A deterministic, fiqh-aware Zakat calculator. Give it a fiqh selection, an
//! asset declaration, a liability declaration and two market prices; get back
//! an auditable breakdown and the payable amount.
//!
//! ```rust
//! use zakat_engine::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let assets = AssetDeclaration::new().cash(LiquidCash::new().in_hand(400_000));
//! let result = compute(
//!     FiqhSchool::Hanafi,
//!     &assets,
//!     &LiabilityDeclaration::new(),
//!     &MarketRates::new(6000, 80),
//! );
//! assert_eq!(result.zakat_payable, dec!(10000));
//! ```

pub mod calculator;
pub mod config;
pub mod inputs;
pub mod liabilities;
pub mod maal;
pub mod madhab;
pub mod nisab;
pub mod prelude;
pub mod pricing;
pub mod report;
pub mod session;
pub mod traits;
pub mod types;

pub use calculator::{AssetDeclaration, compute, compute_with_policy, declaration_schema, result_schema};
pub use config::ZakatConfig;
pub use madhab::{FiqhSchool, NisabStandard};
pub use pricing::MarketRates;
pub use session::ZakatSession;
pub use types::{CalculationResult, ZakatError};
