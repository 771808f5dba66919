//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A 10% discount on 110.00 computed in floats:                          │
//! │    110.0 * 10.0 / 100.0 = 11.000000000000002  ❌                        │
//! │  and the journal no longer balances to the cent.                       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    11000 cents × 1000 / 10000 = 1100 cents  ✅                          │
//! │    Debits and credits are summed exactly.                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exchange rates are the one place a decimal is required; conversion goes
//! through `rust_decimal` and lands back on whole cents.
//!
//! ## Usage
//! ```rust
//! use discount_core::money::Money;
//!
//! let untaxed = Money::from_major_minor(100, 0);
//! let tax = Money::from_cents(1000);
//! assert_eq!((untaxed + tax).cents(), 11000);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::error::CurrencyError;
use crate::types::{DiscountRate, TaxRate};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: journal balances are signed (debit − credit)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **No currency inside**: the owning document carries the currency
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  OrderLine.price_unit ──► OrderLine.subtotal ──► PurchaseOrder.untaxed  │
/// │                                                                         │
/// │  untaxed + tax ──► discount_amount ──► amount_total                     │
/// │                                                                         │
/// │  JournalLine.debit / credit / amount_currency ──► payable rebalance     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use discount_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use discount_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Splits a signed balance into its `(debit, credit)` pair.
    ///
    /// A positive balance is a debit, a negative balance a credit; the
    /// other side is zero.
    ///
    /// ## Example
    /// ```rust
    /// use discount_core::money::Money;
    ///
    /// let (debit, credit) = Money::from_cents(-1100).into_debit_credit();
    /// assert_eq!(debit, Money::zero());
    /// assert_eq!(credit.cents(), 1100);
    /// ```
    #[inline]
    pub const fn into_debit_credit(self) -> (Money, Money) {
        if self.0 > 0 {
            (Money(self.0), Money(0))
        } else {
            (Money(0), Money(-self.0))
        }
    }

    /// Calculates tax for a line subtotal.
    ///
    /// Uses integer math: `(amount * bps + 5000) / 10000`, rounding half away
    /// from zero.
    ///
    /// ## Example
    /// ```rust
    /// use discount_core::money::Money;
    /// use discount_core::types::TaxRate;
    ///
    /// let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825));
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money::from_cents(div_round(self.0 as i128 * rate.bps() as i128, 10_000) as i64)
    }

    /// Applies a percentage expressed as a [`DiscountRate`] and returns the
    /// resulting portion (not the remainder).
    ///
    /// ## Example
    /// ```rust
    /// use discount_core::money::Money;
    /// use discount_core::types::DiscountRate;
    ///
    /// // 10% of 110.00
    /// let part = Money::from_cents(11000).percentage(DiscountRate::from_whole(10));
    /// assert_eq!(part.cents(), 1100);
    /// ```
    pub fn percentage(&self, rate: DiscountRate) -> Money {
        // rate is in hundredths of a percent: 10% = 1000
        Money::from_cents(div_round(self.0 as i128 * rate.hundredths() as i128, 10_000) as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// Callers validate the range first; see
    /// [`Money::checked_multiply_quantity`].
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use discount_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(2500).checked_multiply_quantity(4), Some(Money::from_cents(10000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns the value as a decimal in major units (`1099` → `10.99`).
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Multiplies by a decimal factor and rounds back to whole cents,
    /// half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use discount_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let eur = Money::from_cents(1100);
    /// let usd = eur.scale(Decimal::new(12, 1)).unwrap(); // × 1.2
    /// assert_eq!(usd.cents(), 1320);
    /// ```
    pub fn scale(&self, factor: Decimal) -> Result<Money, CurrencyError> {
        let scaled = Decimal::from(self.0)
            .checked_mul(factor)
            .ok_or(CurrencyError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        scaled
            .to_i64()
            .map(Money::from_cents)
            .ok_or(CurrencyError::Overflow)
    }
}

/// Integer division rounding half away from zero.
fn div_round(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount in major units with two decimals, without a symbol.
/// The owning document knows its currency.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by i64 (quantities, signs).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: i64) -> Self {
        Money(self.0 * factor)
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
