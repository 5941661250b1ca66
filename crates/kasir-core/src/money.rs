//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    Every price, subtotal and total is an i64 count of the smallest     │
//! │    currency unit. 3500 × 2 = 7000, exactly, every time.                │
//! │                                                                         │
//! │  AND: checked arithmetic on the checkout path                           │
//! │    price × quantity that would overflow i64 is an error,               │
//! │    never a silently wrapped total.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price = Money::from_minor(3500);
//!
//! let line_total = price.checked_mul_quantity(2).unwrap();
//! assert_eq!(line_total.minor(), 7000);
//!
//! let total = line_total + Money::from_minor(9000);
//! assert_eq!(total.minor(), 16000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64**: one currency, whole minor units, no fractions
/// - **Single field tuple struct**: serializes as a bare JSON number and
///   maps to an SQLite `INTEGER` column
/// - **Checked helpers**: the checkout path uses `checked_*` so overflow
///   surfaces as an error
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► PricedLine.subtotal ──► Transaction.total_amount
///                         (price × qty)         (Σ subtotals)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let price = Money::from_minor(12000);
    /// assert_eq!(price.minor(), 12000);
    /// ```
    #[inline]
    pub const fn from_minor(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(3000);
    /// assert_eq!(unit_price.checked_mul_quantity(3).unwrap().minor(), 9000);
    ///
    /// assert!(Money::from_minor(i64::MAX).checked_mul_quantity(2).is_none());
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Product: Vit 1000ml, 3000
    /// Quantity: 3
    ///      │
    ///      ▼
    /// checked_mul_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Subtotal: 9000
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Money> for i64 {
    fn from(m: Money) -> Self {
        m.0
    }
}

/// Addition of two Money values.
///
/// Unchecked: only for values already known to be small (display sums, tests).
/// The checkout path uses [`Money::checked_add`].
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(3500);
        assert_eq!(money.minor(), 3500);
        assert_eq!(i64::from(money), 3500);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(16000)), "16000");
        assert_eq!(format!("{}", Money::zero()), "0");
    }

    #[test]
    fn test_checked_mul_quantity() {
        let unit_price = Money::from_minor(3500);
        assert_eq!(unit_price.checked_mul_quantity(2), Some(Money::from_minor(7000)));
        assert_eq!(Money::zero().checked_mul_quantity(1_000), Some(Money::zero()));
        assert_eq!(Money::from_minor(i64::MAX / 2 + 1).checked_mul_quantity(2), None);
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_minor(7000);
        assert_eq!(a.checked_add(Money::from_minor(9000)), Some(Money::from_minor(16000)));
        assert_eq!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)), None);
    }

    #[test]
    fn test_sum() {
        let total: Money = [7000, 9000].into_iter().map(Money::from_minor).sum();
        assert_eq!(total.minor(), 16000);
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Money::from_minor(3500)).unwrap();
        assert_eq!(json, "3500");

        let parsed: Money = serde_json::from_str("12000").unwrap();
        assert_eq!(parsed, Money::from_minor(12000));
    }
}
