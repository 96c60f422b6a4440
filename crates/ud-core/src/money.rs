//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer amounts in the smallest denomination             │
//! │    A price of 10000 is stored as exactly 10000, and 10000 × 3 is       │
//! │    exactly 30000. No rounding step exists anywhere in the core.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core never formats currency. `Display` prints the raw amount; the UI
//! owns localisation.
//!
//! ## Usage
//! ```rust
//! use ud_core::money::Money;
//!
//! let price = Money::from_amount(10_000);
//! let line = price.multiply_quantity(3);
//! assert_eq!(line.amount(), 30_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest denomination supplied by the caller.
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative when goods sell below cost
/// - **Single field tuple struct**: zero-cost abstraction over i64, serialized
///   as a plain number
/// - **sqlx transparent**: stored as a bare INTEGER column
///
/// ## Where Money is Used
/// ```text
/// Goods.sale_price ──┬──► LineItem.sale_price (snapshot) ──► subtotal_sale
///                    │
/// Goods.cost_price ──┴──► LineItem.cost_price (snapshot) ──► subtotal_cost
///
/// Σ subtotal_sale ──► Transaction.total_sale
/// Σ subtotal_cost ──► Transaction.total_cost
/// total_sale - total_cost ──► Transaction.total_profit
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from a raw amount.
    ///
    /// ## Example
    /// ```rust
    /// use ud_core::money::Money;
    ///
    /// let price = Money::from_amount(6_000);
    /// assert_eq!(price.amount(), 6_000);
    /// ```
    #[inline]
    pub const fn from_amount(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use ud_core::money::Money;
    ///
    /// let unit_price = Money::from_amount(10_000);
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.amount(), 30_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
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

    /// Subtracts, returning `None` on overflow.
    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Prints the raw amount, no currency symbol or grouping.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
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

/// Multiplication by i64 (for quantity calculations).
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_amount() {
        let money = Money::from_amount(10_000);
        assert_eq!(money.amount(), 10_000);
        assert!(!money.is_zero());
    }

    #[test]
    fn test_display_is_raw_amount() {
        assert_eq!(format!("{}", Money::from_amount(30_000)), "30000");
        assert_eq!(format!("{}", Money::from_amount(-550)), "-550");
        assert_eq!(format!("{}", Money::zero()), "0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_amount(1000);
        let b = Money::from_amount(500);

        assert_eq!((a + b).amount(), 1500);
        assert_eq!((b - a).amount(), -500);
        assert!((b - a).is_negative());
        assert_eq!((a * 3).amount(), 3000);
    }

    #[test]
    fn test_sum() {
        let values = [
            Money::from_amount(100),
            Money::from_amount(250),
            Money::from_amount(-50),
        ];
        let total: Money = values.iter().sum();
        assert_eq!(total.amount(), 300);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_checked_multiply_quantity() {
        assert_eq!(
            Money::from_amount(6_000).checked_multiply_quantity(3),
            Some(Money::from_amount(18_000))
        );
        assert_eq!(Money::from_amount(i64::MAX).checked_multiply_quantity(2), None);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Money::from_amount(12_000)).unwrap();
        assert_eq!(json, "12000");
    }
}
