//! # Validation Module
//!
//! Precondition checks for discount edits.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Discount Edit Flow                                 │
//! │                                                                         │
//! │  User sets discount_type / discount_rate                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  validate_discount_rate() ← THIS MODULE                                │
//! │           │                                                             │
//! │           ├── invalid? → ValidationError, document untouched           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  calculator::compute_discount()                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ledger::sync_discount_line()   (bills only)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invalid states are rejected, never clamped.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{DiscountRate, DiscountType};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound of a percentage discount, in hundredths.
const MAX_PERCENT_HUNDREDTHS: i64 = 100 * 100;

/// Largest line subtotal in cents (one trillion in major units). Document
/// sums, tax and converted amounts of such lines stay within `i64`.
pub const MAX_LINE_CENTS: i64 = 100_000_000_000_000;

// =============================================================================
// Discount Validators
// =============================================================================

/// Validates a discount rate against its type.
///
/// ## Rules
/// - `Percent`: `0 <= rate <= 100`
/// - `Amount` (and unset): `0 <= rate <= untaxed`
///
/// ## Example
/// ```rust
/// use discount_core::money::Money;
/// use discount_core::types::{DiscountRate, DiscountType};
/// use discount_core::validation::validate_discount_rate;
///
/// let untaxed = Money::from_cents(10000);
/// assert!(validate_discount_rate(Some(DiscountType::Percent), DiscountRate::from_whole(100), untaxed).is_ok());
/// assert!(validate_discount_rate(Some(DiscountType::Percent), DiscountRate::from_whole(150), untaxed).is_err());
/// assert!(validate_discount_rate(Some(DiscountType::Amount), DiscountRate::from_whole(101), untaxed).is_err());
/// ```
pub fn validate_discount_rate(
    discount_type: Option<DiscountType>,
    rate: DiscountRate,
    untaxed: Money,
) -> ValidationResult<()> {
    match discount_type {
        Some(DiscountType::Percent) => {
            if rate.hundredths() > MAX_PERCENT_HUNDREDTHS {
                return Err(ValidationError::PercentTooHigh);
            }
            if rate.is_negative() {
                return Err(ValidationError::NegativePercent);
            }
        }
        Some(DiscountType::Amount) | None => {
            if rate.is_negative() {
                return Err(ValidationError::NegativeAmount);
            }
            if rate.as_money() > untaxed {
                return Err(ValidationError::AmountExceedsUntaxed);
            }
        }
    }

    Ok(())
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a document or line name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an order line quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates quantity × unit price of a line and returns the subtotal.
pub fn validate_line_amount(price_unit: Money, qty: i64) -> ValidationResult<Money> {
    price_unit
        .checked_multiply_quantity(qty)
        .filter(|subtotal| (-MAX_LINE_CENTS..=MAX_LINE_CENTS).contains(&subtotal.cents()))
        .ok_or_else(|| ValidationError::TooLarge {
            field: "line amount".to_string(),
            max: Money::from_cents(MAX_LINE_CENTS),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn untaxed() -> Money {
        Money::from_cents(10000)
    }

    #[test]
    fn test_percent_bounds() {
        let pct = Some(DiscountType::Percent);
        assert!(validate_discount_rate(pct, DiscountRate::zero(), untaxed()).is_ok());
        assert!(validate_discount_rate(pct, DiscountRate::from_whole(100), untaxed()).is_ok());
        assert_eq!(
            validate_discount_rate(pct, DiscountRate::from_whole(150), untaxed()),
            Err(ValidationError::PercentTooHigh)
        );
        assert_eq!(
            validate_discount_rate(pct, DiscountRate::from_whole(-5), untaxed()),
            Err(ValidationError::NegativePercent)
        );
    }

    #[test]
    fn test_percent_ignores_untaxed() {
        // 50% of an empty order is still a valid percentage
        let result = validate_discount_rate(
            Some(DiscountType::Percent),
            DiscountRate::from_whole(50),
            Money::zero(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_amount_bounds() {
        let amt = Some(DiscountType::Amount);
        assert!(validate_discount_rate(amt, DiscountRate::zero(), untaxed()).is_ok());
        assert!(validate_discount_rate(amt, DiscountRate::from_whole(100), untaxed()).is_ok());
        assert_eq!(
            validate_discount_rate(amt, DiscountRate::from_hundredths(10001), untaxed()),
            Err(ValidationError::AmountExceedsUntaxed)
        );
        assert_eq!(
            validate_discount_rate(amt, DiscountRate::from_whole(-1), untaxed()),
            Err(ValidationError::NegativeAmount)
        );
    }

    #[test]
    fn test_unset_type_uses_amount_rules() {
        assert_eq!(
            validate_discount_rate(None, DiscountRate::from_whole(-1), untaxed()),
            Err(ValidationError::NegativeAmount)
        );
        assert!(validate_discount_rate(None, DiscountRate::zero(), untaxed()).is_ok());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_line_amount() {
        assert_eq!(
            validate_line_amount(Money::from_cents(2500), 4),
            Ok(Money::from_cents(10000))
        );
        assert!(validate_line_amount(Money::from_cents(MAX_LINE_CENTS), 1).is_ok());
        assert!(validate_line_amount(Money::from_cents(MAX_LINE_CENTS), 2).is_err());

        // 1,000,000,000 × 999,999,999.99 does not fit in i64 cents
        let err = validate_line_amount(Money::from_cents(99_999_999_999), 1_000_000_000).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "PO0001").is_ok());
        assert!(validate_name("name", "  ").is_err());
    }
}
