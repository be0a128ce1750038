//! Positive monetary amounts using decimal arithmetic.
//!
//! Donations, campaign increments and payment intents all take an amount in
//! major currency units from a loosely-typed JSON body. The amount may arrive
//! as a JSON number or as a numeric string; anything else, and anything not
//! strictly positive, is rejected before a write happens.

use core::fmt;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Errors that can occur when reading an [`Amount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The value is missing or not a number.
    #[error("amount must be numeric")]
    NotNumeric,
    /// The value is zero or negative.
    #[error("amount must be greater than zero")]
    NotPositive,
    /// The value does not fit the target representation.
    #[error("amount is too large")]
    Overflow,
}

/// A strictly positive amount in major units (e.g. dollars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Wrap a decimal, rejecting zero and negative values.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::NotPositive` if `value <= 0`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }
        Ok(Self(value))
    }

    /// Read an amount from a JSON value (number or numeric string).
    ///
    /// # Errors
    ///
    /// Returns `NotNumeric` for non-numeric input and `NotPositive` for
    /// values `<= 0`.
    pub fn from_json(value: &Value) -> Result<Self, AmountError> {
        let decimal = match value {
            Value::Number(n) => parse_decimal(&n.to_string())?,
            Value::String(s) => parse_decimal(s.trim())?,
            _ => return Err(AmountError::NotNumeric),
        };
        Self::new(decimal)
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// The amount as `f64`, for storage in numeric document fields.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Overflow` if the value has no `f64` form.
    pub fn to_f64(&self) -> Result<f64, AmountError> {
        self.0.to_f64().ok_or(AmountError::Overflow)
    }

    /// The amount in minor units (cents), rounded half away from zero.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Overflow` if the result does not fit an `i64`.
    pub fn to_minor_units(&self) -> Result<i64, AmountError> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(AmountError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(AmountError::Overflow)
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal, AmountError> {
    if raw.is_empty() {
        return Err(AmountError::NotNumeric);
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| AmountError::NotNumeric)
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
