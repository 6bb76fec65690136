//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing a cart in floating point:                                      │
//! │    38.99 + 30.10 + 22.20 = 91.28999999999999  ❌                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    3899 + 3010 + 2220 = 9129 cents = $91.29   ✅                        │
//! │                                                                         │
//! │  Rounding happens only where a rate is applied (tax, promo), once,     │
//! │  half-up at the cent.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Untrusted Input
//! Prices reach us as numbers (`38.99`), strings (`"38.99"`) and strings
//! with currency markers (`"S$38.99"`). Every ingestion path goes through
//! [`Money::parse`] / [`Money::from_untrusted`] so there is exactly one place
//! where that coercion happens.
//!
//! ## Usage
//! ```rust
//! use topcare_core::money::Money;
//!
//! let price = Money::from_cents(3899);            // $38.99
//! let parsed = Money::parse("S$38.99").unwrap();
//! assert_eq!(price, parsed);
//!
//! let line = price * 2;                           // $77.98
//! assert_eq!(line.to_string(), "$77.98");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use tracing::warn;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediate values (e.g. discount
///   larger than the bill before clamping)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as cents**: `{"price": 3899}` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use topcare_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a decimal amount (as the JSON backend sends it) to cents.
    ///
    /// Returns `None` for NaN, infinities and values that do not fit.
    ///
    /// ```rust
    /// use topcare_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(38.99), Some(Money::from_cents(3899)));
    /// assert_eq!(Money::from_decimal(f64::NAN), None);
    /// ```
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        let cents = (value * 100.0).round();
        if cents < i64::MIN as f64 || cents >= i64::MAX as f64 {
            return None;
        }

        Some(Money(cents as i64))
    }

    /// Parses a price string from untrusted input.
    ///
    /// ## Accepted Shapes
    /// ```text
    /// "38.99"       → 3899
    /// "S$38.99"     → 3899     (leading currency marker)
    /// "38.99 SGD"   → 3899     (trailing currency marker)
    /// "1,234.5"     → 123450   (digit grouping)
    /// "-$5.50"      → -550
    /// "0.125"       → 13       (third fraction digit rounds half-up)
    /// "abc", "", "." → InvalidFormat
    /// ```
    ///
    /// The number itself is read digit by digit, never through `f64`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: reason.to_string(),
        };

        let is_marker = |c: char| !c.is_ascii_digit() && c != '.' && c != '-' && c != ',';

        let body = input.trim().trim_start_matches(is_marker);
        let (negative, body) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let body = body
            .trim_start_matches(is_marker)
            .trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.');

        let digits: String = body.chars().filter(|c| *c != ',' && *c != '_').collect();
        let (major, minor) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits.as_str(), ""),
        };

        if major.is_empty() && minor.is_empty() {
            return Err(invalid("no digits"));
        }
        if !major.chars().all(|c| c.is_ascii_digit()) || !minor.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("not a number"));
        }

        let mut cents: i64 = 0;
        for digit in major.bytes() {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(i64::from(digit - b'0')))
                .ok_or_else(|| invalid("amount too large"))?;
        }

        let fraction: Vec<i64> = minor.bytes().map(|d| i64::from(d - b'0')).collect();
        let tenths = fraction.first().copied().unwrap_or(0);
        let hundredths = fraction.get(1).copied().unwrap_or(0);
        let round_up = fraction.get(2).is_some_and(|d| *d >= 5);

        cents = cents
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Coerces a loosely-typed JSON price into Money.
    ///
    /// Numbers go through [`Money::from_decimal`], strings through
    /// [`Money::parse`]. Anything else, or anything that fails to convert,
    /// is logged and becomes zero: a bad price must never block the UI.
    pub fn from_untrusted(value: &Value) -> Self {
        let converted = match value {
            Value::Number(n) => n.as_f64().and_then(Money::from_decimal),
            Value::String(s) => Money::parse(s).ok(),
            _ => None,
        };

        converted.unwrap_or_else(|| {
            warn!(value = %value, "Unusable price in payload, treating as zero");
            Money::zero()
        })
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the value, or zero if it is negative.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Returns `bps` basis points of this amount, rounded half-up.
    ///
    /// ```rust
    /// use topcare_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(10000);       // $100.00
    /// assert_eq!(subtotal.percentage(1000).cents(), 1000); // 10% = $10.00
    ///
    /// let odd = Money::from_cents(4999);             // $49.99
    /// assert_eq!(odd.percentage(1000).cents(), 500); // $4.999 → $5.00
    /// ```
    ///
    /// Negative amounts round towards positive infinity at the half cent.
    pub fn percentage(&self, bps: u32) -> Money {
        let portion = (self.0 as i128 * bps as i128 + 5000).div_euclid(10000);
        Money(portion as i64)
    }

    /// Calculates tax at the given rate, rounded half-up.
    ///
    /// ```rust
    /// use topcare_core::money::Money;
    /// use topcare_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(4999);          // $49.99
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(800));
    /// assert_eq!(tax.cents(), 400);                    // $3.9992 → $4.00
    /// ```
    #[inline]
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.percentage(rate.bps())
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Plain decimal rendering without a currency symbol, e.g. `102.99`.
    ///
    /// This is the shape the order-confirmation screen receives as a query
    /// parameter.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }

    /// Renders with a caller-chosen currency symbol, e.g. `S$38.99`.
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and logs; the storefront formats with its configured symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol("$"))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
