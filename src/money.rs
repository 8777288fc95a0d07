//! Exact monetary values with two-decimal semantics.
//!
//! Balances and prices are held as integer cents so that wallet arithmetic is
//! exact and the `balance >= 0` invariant can be enforced with integer
//! comparisons at the database level. The JSON surface speaks dollars.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A monetary value in integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(0);

    /// Construct from integer cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The raw cent count.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Construct from a dollar amount, rounding to the nearest cent.
    ///
    /// Returns `None` for non-finite values or values outside the cent range.
    #[must_use]
    pub fn from_amount(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents.abs() > 9_007_199_254_740_992.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)] // range checked above
        Some(Self(cents as i64))
    }

    /// The dollar amount as a float, for JSON responses.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn amount(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `true` when the value is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Multiply by a quantity, failing on overflow.
    #[must_use]
    pub const fn checked_mul(self, quantity: i64) -> Option<Self> {
        match self.0.checked_mul(quantity) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    /// Formats as a plain two-decimal dollar amount, e.g. `12.34`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

// Lets sqlx row mapping convert the stored cent column with
// `#[sqlx(try_from = "i64")]`.
impl TryFrom<i64> for Money {
    type Error = std::convert::Infallible;

    fn try_from(cents: i64) -> std::result::Result<Self, Self::Error> {
        Ok(Self(cents))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.amount())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Self::from_amount(amount)
            .ok_or_else(|| de::Error::custom("'Amount' must be a valid number."))
    }
}
