//! Input normalization.
//!
//! Every figure entering the engine passes through [`normalize`]: whatever the
//! caller typed, the engine sees a finite, non-negative `Decimal`. Unparsable,
//! non-finite or negative input silently becomes zero so that a half-typed
//! form field never blocks a recomputation.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::types::ZakatError;

/// Trait for converting various types into `Decimal` for Zakat calculations.
///
/// This trait allows users to pass `i32`, `f64`, `&str`, etc. directly into
/// setters without needing to wrap them in `dec!()` or `Decimal::from()`.
pub trait IntoZakatDecimal {
    fn into_zakat_decimal(self) -> Result<Decimal, ZakatError>;
}

impl IntoZakatDecimal for Decimal {
    fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
        Ok(self)
    }
}

macro_rules! impl_into_zakat_decimal_int {
    ($($t:ty),*) => {
        $(
            impl IntoZakatDecimal for $t {
                fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
                    Ok(Decimal::from(self))
                }
            }
        )*
    };
}

impl_into_zakat_decimal_int!(i32, u32, i64, u64, isize, usize);

macro_rules! impl_into_zakat_decimal_float {
    ($($t:ty),*) => {
        $(
            impl IntoZakatDecimal for $t {
                fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
                    if !self.is_finite() {
                        return Err(invalid(self, "value is not finite"));
                    }
                    Decimal::from_f64_retain(self as f64)
                        .ok_or_else(|| invalid(self, "value is out of range"))
                }
            }
        )*
    };
}

impl_into_zakat_decimal_float!(f32, f64);

impl IntoZakatDecimal for &str {
    fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
        let cleaned = clean_numeric(self);
        if cleaned.is_empty() {
            return Err(invalid(self, "empty value"));
        }
        Decimal::from_str(&cleaned)
            .or_else(|_| Decimal::from_scientific(&cleaned))
            .map_err(|e| invalid(self, e))
    }
}

impl IntoZakatDecimal for String {
    fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
        self.as_str().into_zakat_decimal()
    }
}

impl IntoZakatDecimal for &String {
    fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
        self.as_str().into_zakat_decimal()
    }
}

impl<T: IntoZakatDecimal> IntoZakatDecimal for Option<T> {
    fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
        match self {
            Some(v) => v.into_zakat_decimal(),
            None => Ok(Decimal::ZERO),
        }
    }
}

fn invalid(value: impl std::fmt::Display, reason: impl std::fmt::Display) -> ZakatError {
    ZakatError::InvalidInput {
        field: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Strips whitespace, grouping separators and currency symbols.
///
/// Keeps ASCII digits, `.`, a leading sign and exponent markers so that
/// `"₹ 1,23,456.50"` parses as `123456.50`.
fn clean_numeric(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .collect()
}

/// Coerces any numeric-like input to a non-negative finite `Decimal`.
///
/// Never fails. Invalid, non-finite and negative values become zero.
pub fn normalize(value: impl IntoZakatDecimal) -> Decimal {
    match value.into_zakat_decimal() {
        Ok(v) if v.is_sign_negative() && !v.is_zero() => {
            tracing::debug!(value = %v, "negative input coerced to zero");
            Decimal::ZERO
        }
        Ok(v) => v.normalize(),
        Err(e) => {
            tracing::debug!(error = %e, "unparsable input coerced to zero");
            Decimal::ZERO
        }
    }
}

/// Re-applies the non-negative floor to an already-typed value.
///
/// Used on deserialized declarations, whose fields bypass [`normalize`].
pub(crate) fn floor_zero(value: Decimal) -> Decimal {
    if value.is_sign_negative() { Decimal::ZERO } else { value }
}
