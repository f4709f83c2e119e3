//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                      │
//! │                                                                  │
//! │  In floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                    │
//! │                                                                  │
//! │  OUR SOLUTION: Integer Cents                                     │
//! │    4500 cents settles an order worth 45.00, exactly              │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every monetary value in the settlement path - gross, discounts, fees,
//! net, ledger balances, movement amounts - flows through this type or
//! its raw `_cents: i64` representation in persisted records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for outflows and refunds
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use forno_core::money::Money;
    ///
    /// let net = Money::from_cents(4500); // 45.00
    /// assert_eq!(net.cents(), 4500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// True if the value is exactly zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// True if the value is below zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Saturating addition, for running totals that must never wrap.
    #[inline]
    pub const fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    /// Saturating, like [`Money::saturating_add`]; line extensions must
    /// never wrap.
    fn mul(self, rhs: i64) -> Money {
        Money(self.0.saturating_mul(rhs))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl fmt::Display for Money {
    /// Formats as `major.minor`, e.g. `45.00` or `-3.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let gross = Money::from_cents(5000);
        let discount = Money::from_cents(500);
        let net = gross - discount;
        assert_eq!(net.cents(), 4500);
        assert_eq!((net * 2).cents(), 9000);
        assert_eq!((-net).cents(), -4500);
    }

    #[test]
    fn test_multiplication_saturates_at_the_extremes() {
        assert_eq!((Money::from_cents(i64::MAX) * 2).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) * 2).cents(), i64::MIN);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(4500).to_string(), "45.00");
        assert_eq!(Money::from_cents(105).to_string(), "1.05");
        assert_eq!(Money::from_cents(-350).to_string(), "-3.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_predicates() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::from_cents(1).is_negative());
    }
}
