//! # Money Module
//!
//! Dual-currency monetary types for a USD / bolívar shop.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                 │
//! │                                                             │
//! │  In floating point:                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                          │
//! │                                                             │
//! │  OUR SOLUTION: Integer Cents                                │
//! │    Every amount is an i64 in the smallest unit of its       │
//! │    currency. USD→Bs conversion is integer math with a       │
//! │    fixed-point exchange rate in millis (36500 = 36.5).      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bodega_core::money::{ExchangeRate, Money};
//!
//! let price = Money::from_cents(200);          // $2.00
//! let rate = ExchangeRate::from_millis(36_500); // 36.5 Bs per USD
//!
//! assert_eq!(price.to_bs(rate).cents(), 7_300); // Bs 73.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of its currency (cents / céntimos).
///
/// The same type carries USD and Bs amounts; which currency a value is in
/// is a property of the field holding it, never of the arithmetic.
///
/// ## Design Decisions
/// - **i64 (signed)**: negative values represent refunds and shortages
/// - **Single-field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
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

    /// Returns the major unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Converts a USD amount to bolívars at the given exchange rate.
    ///
    /// Rounds half-up using integer math over i128 so large amounts
    /// cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::{ExchangeRate, Money};
    ///
    /// let total = Money::from_cents(540);           // $5.40
    /// let rate = ExchangeRate::from_millis(36_500); // 36.5
    /// assert_eq!(total.to_bs(rate).cents(), 19_710); // Bs 197.10
    /// ```
    pub fn to_bs(&self, rate: ExchangeRate) -> Money {
        let bs = (self.0 as i128 * rate.millis() as i128 + 500) / 1000;
        Money::from_cents(bs as i64)
    }

    /// Clamps negative values to zero.
    #[inline]
    pub fn clamp_non_negative(&self) -> Money {
        if self.0 < 0 {
            Money::zero()
        } else {
            *self
        }
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// USD → Bs exchange rate in millis (fixed point, 3 decimal places).
///
/// ## Why Millis?
/// 36500 millis = 36.500 Bs per USD. Storing the rate as an integer keeps
/// every conversion in integer arithmetic; the float constructor exists
/// only as a convenience at the configuration edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExchangeRate(i64);

impl ExchangeRate {
    /// Creates a rate from millis (36_500 = 36.5 Bs/USD).
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        ExchangeRate(millis)
    }

    /// Creates a rate from a float (for configuration input).
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::ExchangeRate;
    ///
    /// assert_eq!(ExchangeRate::from_float(36.5).millis(), 36_500);
    /// ```
    pub fn from_float(rate: f64) -> Self {
        ExchangeRate((rate * 1000.0).round() as i64)
    }

    /// Returns the rate in millis.
    #[inline]
    pub const fn millis(&self) -> i64 {
        self.0
    }

    /// Returns the rate as a float (for display only).
    #[inline]
    pub fn as_float(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Checks whether the rate is usable for conversions.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl Default for ExchangeRate {
    /// 1:1 until the shop configures a real rate.
    fn default() -> Self {
        ExchangeRate(1000)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A cart- or coupon-level discount.
///
/// Modeled as a tagged union rather than a `{value, type}` pair so an
/// amount can never be interpreted under the wrong tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the subtotal, in basis points (1000 = 10%).
    Percentage(u32),
    /// Fixed USD amount.
    Fixed(Money),
}

impl Discount {
    /// Computes the discount amount for a subtotal.
    ///
    /// The result is capped at the subtotal so a discount can never push
    /// a total below zero.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::{Discount, Money};
    ///
    /// let subtotal = Money::from_cents(600); // $6.00
    /// assert_eq!(Discount::Percentage(1000).amount_on(subtotal).cents(), 60);
    /// assert_eq!(Discount::Fixed(Money::from_cents(1000)).amount_on(subtotal).cents(), 600);
    /// ```
    pub fn amount_on(&self, subtotal: Money) -> Money {
        let raw = match self {
            Discount::Percentage(bps) => {
                let cents = (subtotal.cents() as i128 * *bps as i128 + 5000) / 10000;
                Money::from_cents(cents as i64)
            }
            Discount::Fixed(amount) => *amount,
        };
        raw.clamp_non_negative().min(subtotal)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented display; the frontend owns localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
