//! # Money Module
//!
//! Provides the `Price` type for book prices and cart totals.
//!
//! ## Why Integer Cents?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Book prices are fixed-point: 8 digits, 2 of them after the point.     │
//! │                                                                         │
//! │    "12.30"  ──parse──►  Price(1230)  ──Display──►  "12.30"             │
//! │                                                                         │
//! │  Storing cents as i64 keeps every sum exact. Floats never appear.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bookstore_core::money::Price;
//!
//! let price = Price::parse("12.30").unwrap();
//! assert_eq!(price.cents(), 1230);
//! assert_eq!((price * 3).to_string(), "36.90");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::MAX_PRICE_CENTS;

/// A monetary value in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Price(i64);

impl Price {
    /// Creates a price from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Price(cents)
    }

    /// Creates a price from whole units and cents.
    ///
    /// ## Example
    /// ```rust
    /// use bookstore_core::money::Price;
    ///
    /// assert_eq!(Price::from_major_minor(19, 99).cents(), 1999);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        Price(major * 100 + minor)
    }

    /// Parses decimal text such as `"7"`, `"7.5"` or `"7.50"`.
    ///
    /// ## Rules
    /// - At most 2 fractional digits
    /// - No sign (prices are never negative)
    /// - At most [`MAX_PRICE_CENTS`]
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: reason.to_string(),
        };

        if text.is_empty() {
            return Err(ValidationError::Required {
                field: "price".to_string(),
            });
        }

        let (major, minor) = match text.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (text, ""),
        };

        if major.is_empty() || !major.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected digits before the decimal point"));
        }
        if minor.len() > 2 || !minor.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most 2 digits after the decimal point"));
        }
        let out_of_range = || ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        };

        // Digits only at this point, so a parse failure is overflow.
        let major: i64 = major.parse().map_err(|_| out_of_range())?;
        let minor: i64 = match minor.len() {
            0 => 0,
            1 => minor.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
            _ => minor.parse().map_err(|_| invalid("bad cents"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(minor))
            .filter(|cents| *cents <= MAX_PRICE_CENTS)
            .ok_or_else(out_of_range)?;

        Ok(Price(cents))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Price(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies the price by a line-item quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Price(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering, e.g. `"1234.50"`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::zero()
    }
}

impl Add for Price {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Price(self.0 + other.0)
    }
}

impl AddAssign for Price {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Mul<i64> for Price {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        iter.fold(Price::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
