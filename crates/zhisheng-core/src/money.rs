//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Floating point:   0.1 + 0.2        = 0.30000000000000004               │
//! │  Fen (integer):    10  + 20         = 30          → "¥0.30"             │
//! │                                                                         │
//! │  Cart totals are sums of price × quantity over many lines. Summing      │
//! │  floats drifts; summing fen does not.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Page scripts and the persisted cart still speak decimal yuan (`12.5`).
//! The conversion happens exactly once, at the boundary, via
//! [`Money::from_decimal`] / [`Money::to_decimal`] and the [`as_decimal`]
//! serde adapter.
//!
//! ## Usage
//! ```rust
//! use zhisheng_core::money::Money;
//!
//! let price = Money::from_fen(1099); // ¥10.99
//! let doubled = price * 2;            // ¥21.98
//! let total = price + Money::from_fen(500);
//! assert_eq!(total.to_string(), "¥15.99");
//! assert_eq!(doubled.fen(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::CURRENCY_SYMBOL;

/// Fen per yuan.
const FEN_PER_YUAN: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in fen (1/100 yuan).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds, discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serde**: serializes as fen; use [`as_decimal`] for the yuan wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from fen (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use zhisheng_core::money::Money;
    ///
    /// let price = Money::from_fen(1099); // Represents ¥10.99
    /// assert_eq!(price.fen(), 1099);
    /// ```
    #[inline]
    pub const fn from_fen(fen: i64) -> Self {
        Money(fen)
    }

    /// Creates a Money value from yuan and fen parts.
    ///
    /// For negative amounts only the yuan part should be negative:
    /// `from_yuan_fen(-5, 50)` is -¥5.50.
    #[inline]
    pub const fn from_yuan_fen(yuan: i64, fen: i64) -> Self {
        if yuan < 0 {
            Money(yuan * FEN_PER_YUAN - fen)
        } else {
            Money(yuan * FEN_PER_YUAN + fen)
        }
    }

    /// Converts a decimal yuan amount into fen, rounding to the nearest fen.
    ///
    /// The rounding happens on the binary value, so `9.995` (stored as
    /// `9.99499…`) becomes 999 fen, matching what a page script's
    /// `toFixed(2)` would show.
    ///
    /// ## Example
    /// ```rust
    /// use zhisheng_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(12.5).unwrap().fen(), 1250);
    /// assert!(Money::from_decimal(f64::NAN).is_err());
    /// ```
    pub fn from_decimal(yuan: f64) -> CoreResult<Self> {
        if !yuan.is_finite() {
            return Err(CoreError::InvalidAmount(yuan.to_string()));
        }

        let fen = (yuan * FEN_PER_YUAN as f64).round();
        if fen > i64::MAX as f64 || fen < i64::MIN as f64 {
            return Err(CoreError::InvalidAmount(yuan.to_string()));
        }

        Ok(Money(fen as i64))
    }

    /// Returns the amount as decimal yuan (for the wire format only).
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / FEN_PER_YUAN as f64
    }

    /// Returns the value in fen.
    #[inline]
    pub const fn fen(&self) -> i64 {
        self.0
    }

    /// Returns the whole-yuan portion (truncated toward zero).
    #[inline]
    pub const fn yuan(&self) -> i64 {
        self.0 / FEN_PER_YUAN
    }

    /// Returns the fen portion (always 0-99).
    #[inline]
    pub const fn fen_part(&self) -> i64 {
        (self.0 % FEN_PER_YUAN).abs()
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use zhisheng_core::money::Money;
    ///
    /// let unit_price = Money::from_fen(299); // ¥2.99
    /// assert_eq!(unit_price.multiply_quantity(3).fen(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Formats with an explicit currency symbol and two decimals.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}{}.{:02}", sign, symbol, self.yuan().abs(), self.fen_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

// Arithmetic saturates at the i64 bounds.

/// Display shows the yuan symbol and two decimals: `¥10.99`, `-¥5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(CURRENCY_SYMBOL))
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Decimal Wire Format
// =============================================================================

/// Serde adapter for fields stored as decimal yuan numbers.
///
/// ```rust,ignore
/// #[serde(with = "crate::money::as_decimal")]
/// pub price: Money,
/// ```
pub mod as_decimal {
    use super::Money;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole-yuan amounts go out as integers so `9` stays `9`, not `9.0`
        if money.fen_part() == 0 {
            serializer.serialize_i64(money.yuan())
        } else {
            serializer.serialize_f64(money.to_decimal())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let yuan = f64::deserialize(deserializer)?;
        Money::from_decimal(yuan).map_err(de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fen() {
        let money = Money::from_fen(1099);
        assert_eq!(money.fen(), 1099);
        assert_eq!(money.yuan(), 10);
        assert_eq!(money.fen_part(), 99);
    }

    #[test]
    fn test_from_yuan_fen() {
        assert_eq!(Money::from_yuan_fen(10, 99).fen(), 1099);
        assert_eq!(Money::from_yuan_fen(-5, 50).fen(), -550);
    }

    #[test]
    fn test_from_decimal_rounds_to_nearest_fen() {
        assert_eq!(Money::from_decimal(9.0).unwrap().fen(), 900);
        assert_eq!(Money::from_decimal(12.345).unwrap().fen(), 1235);
        assert_eq!(Money::from_decimal(9.996).unwrap().fen(), 1000);
        // 9.995 is 9.99499.. in binary
        assert_eq!(Money::from_decimal(9.995).unwrap().fen(), 999);
    }

    #[test]
    fn test_from_decimal_rejects_non_finite() {
        assert!(Money::from_decimal(f64::NAN).is_err());
        assert!(Money::from_decimal(f64::INFINITY).is_err());
        assert!(Money::from_decimal(1e300).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_fen(1099).to_string(), "¥10.99");
        assert_eq!(Money::from_fen(500).to_string(), "¥5.00");
        assert_eq!(Money::from_fen(-550).to_string(), "-¥5.50");
        assert_eq!(Money::zero().to_string(), "¥0.00");
        assert_eq!(Money::from_fen(1099).format_with("$"), "$10.99");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_fen(1000);
        let b = Money::from_fen(500);

        assert_eq!((a + b).fen(), 1500);
        assert_eq!((a - b).fen(), 500);
        assert_eq!((a * 3).fen(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.fen(), 2000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_decimal(1e14).unwrap();
        assert_eq!(huge.multiply_quantity(1_000_000).fen(), i64::MAX);
        assert_eq!((huge * 1_000_000).fen(), i64::MAX);
        assert_eq!((Money::from_fen(i64::MAX) + Money::from_fen(1)).fen(), i64::MAX);
        assert_eq!((Money::from_fen(i64::MIN) - Money::from_fen(1)).fen(), i64::MIN);

        let total: Money = vec![Money::from_fen(i64::MAX), Money::from_fen(i64::MAX)]
            .into_iter()
            .sum();
        assert_eq!(total.fen(), i64::MAX);
    }

    #[test]
    fn test_from_decimal_rounds_ties_up() {
        assert_eq!(Money::from_decimal(0.125).unwrap().fen(), 13);
        assert_eq!(Money::from_decimal(1.125).unwrap().fen(), 113);
        assert_eq!(Money::from_decimal(-0.125).unwrap().fen(), -13);
    }

    #[test]
    fn test_decimal_wire_format() {
        #[derive(Serialize, Deserialize)]
        struct Line {
            #[serde(with = "as_decimal")]
            price: Money,
        }

        let json = serde_json::to_string(&Line { price: Money::from_fen(1250) }).unwrap();
        assert_eq!(json, r#"{"price":12.5}"#);

        let json = serde_json::to_string(&Line { price: Money::from_fen(900) }).unwrap();
        assert_eq!(json, r#"{"price":9}"#);

        let line: Line = serde_json::from_str(r#"{"price":19.9}"#).unwrap();
        assert_eq!(line.price.fen(), 1990);

        let line: Line = serde_json::from_str(r#"{"price":3}"#).unwrap();
        assert_eq!(line.price.fen(), 300);
    }
}
