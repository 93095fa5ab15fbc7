//! Money and stock value objects.
//!
//! DDD: Value objects - immutable, compared by value, valid by construction.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::DomainError;
use crate::config::{MAX_MONEY_CENTS, MONEY_SCALE};

/// A non-negative monetary amount with exactly two fractional digits.
///
/// Amounts enter as strings so no binary float ever touches the value.
/// Extra precision is rounded half-to-even: `"19.999"` becomes `20.00`,
/// `"0.125"` becomes `0.12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Parse and normalize a decimal string.
    ///
    /// # Errors
    /// `DomainError::InvalidAmount` when the input is not a decimal number
    /// or rounds to a negative amount.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| DomainError::InvalidAmount(raw.to_string()))?;

        Self::from_decimal(value).map_err(|_| DomainError::InvalidAmount(raw.to_string()))
    }

    /// Normalize an already-parsed decimal.
    pub fn from_decimal(value: Decimal) -> Result<Self, DomainError> {
        let mut quantized =
            value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);
        if quantized.is_sign_negative() && !quantized.is_zero() {
            return Err(DomainError::InvalidAmount(value.to_string()));
        }
        if quantized.is_zero() {
            quantized = Decimal::ZERO;
        }
        quantized.rescale(MONEY_SCALE);
        // rescale leaves values with too many integer digits untouched
        let max = Decimal::new(MAX_MONEY_CENTS, MONEY_SCALE);
        if quantized.scale() != MONEY_SCALE || quantized > max {
            return Err(DomainError::InvalidAmount(value.to_string()));
        }
        Ok(Self(quantized))
    }

    /// Zero amount.
    pub fn zero() -> Self {
        let mut value = Decimal::ZERO;
        value.rescale(MONEY_SCALE);
        Self(value)
    }

    /// The quantized amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

/// A non-negative count of inventory units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Stock(i64);

impl Stock {
    /// # Errors
    /// `DomainError::InvalidStock` when `units` is negative.
    pub fn new(units: i64) -> Result<Self, DomainError> {
        if units < 0 {
            return Err(DomainError::InvalidStock(units));
        }
        Ok(Self(units))
    }

    pub fn units(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Stock {
    type Error = DomainError;

    fn try_from(units: i64) -> Result<Self, Self::Error> {
        Self::new(units)
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
