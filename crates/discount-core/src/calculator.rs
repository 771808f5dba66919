//! # Discount Calculator
//!
//! Maps `(discount_type, discount_rate, untaxed, tax)` to the discount amount
//! and the recomputed total. Shared by purchase orders and bills.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  type     │ discount_amount                        │ rate afterwards   │
//! │  ─────────┼────────────────────────────────────────┼────────────────── │
//! │  amount   │ rate if untaxed > 0, else 0            │ unchanged         │
//! │  percent  │ (untaxed + tax) × rate / 100           │ unchanged         │
//! │  unset    │ 0                                      │ reset to 0        │
//! │                                                                         │
//! │  total = untaxed + tax − discount_amount                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{DiscountRate, DiscountType};

/// Result of a discount computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTotals {
    /// The rate the document should hold afterwards (zeroed when unset).
    pub discount_rate: DiscountRate,
    pub discount_amount: Money,
    pub amount_total: Money,
}

/// Computes the discount amount and total.
///
/// ## Example
/// ```rust
/// use discount_core::calculator::compute_discount;
/// use discount_core::money::Money;
/// use discount_core::types::{DiscountRate, DiscountType};
///
/// let totals = compute_discount(
///     Some(DiscountType::Percent),
///     DiscountRate::from_whole(10),
///     Money::from_cents(10000),
///     Money::from_cents(1000),
/// );
/// assert_eq!(totals.discount_amount.cents(), 1100);
/// assert_eq!(totals.amount_total.cents(), 9900);
/// ```
pub fn compute_discount(
    discount_type: Option<DiscountType>,
    discount_rate: DiscountRate,
    untaxed: Money,
    tax: Money,
) -> DiscountTotals {
    let (discount_rate, discount_amount) = match discount_type {
        Some(DiscountType::Amount) => {
            let amount = if untaxed.is_positive() {
                discount_rate.as_money()
            } else {
                Money::zero()
            };
            (discount_rate, amount)
        }
        Some(DiscountType::Percent) => {
            let amount = if discount_rate.is_zero() {
                Money::zero()
            } else {
                (untaxed + tax).percentage(discount_rate)
            };
            (discount_rate, amount)
        }
        None => (DiscountRate::zero(), Money::zero()),
    };

    DiscountTotals {
        discount_rate,
        discount_amount,
        amount_total: untaxed + tax - discount_amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
