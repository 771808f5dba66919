//! # Error Types
//!
//! Domain-specific error types for discount-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  discount-core errors (this file)                                      │
//! │  ├── CoreError        - Document and ledger errors                     │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── CurrencyError    - Missing rates, conversion overflow             │
//! │                                                                         │
//! │  discount-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── CliError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → stderr                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;
use crate::types::{CurrencyCode, MoveState};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The document is not in a state that allows edits.
    ///
    /// ## When This Occurs
    /// - Changing the discount of a posted bill
    /// - Posting a bill twice
    #[error("Document {document} is {state}, cannot perform operation")]
    DocumentLocked { document: String, state: MoveState },

    /// A bill has no payable line to absorb the discount.
    #[error("Document {document} has no payable line")]
    MissingPayableLine { document: String },

    /// A bill has nothing but payable lines, so there is no balance to mirror.
    #[error("Document {document} has no lines besides the payable line")]
    MissingCounterpartLines { document: String },

    /// Debits and credits of a document do not match.
    #[error("Document {document} is unbalanced: debit {debit}, credit {credit}")]
    Unbalanced {
        document: String,
        debit: Money,
        credit: Money,
    },

    /// The company currency was changed after the document booked lines in
    /// the previous one.
    #[error("Document {document} is booked in {booked}, company currency is now {configured}")]
    CompanyCurrencyChanged {
        document: String,
        booked: CurrencyCode,
        configured: CurrencyCode,
    },

    /// The company currency cannot change while journal entries are
    /// booked in it.
    #[error("Company {company_id} has {entries} journal entries in {currency}, currency cannot change")]
    CompanyCurrencyLocked {
        company_id: String,
        currency: CurrencyCode,
        entries: i64,
    },

    /// Currency conversion failed.
    #[error("Currency error: {0}")]
    Currency(#[from] CurrencyError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The discount variants carry the exact messages shown to the user when a
/// discount edit is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Percentage discount above 100.
    #[error("Please enter percentage value less than 100 %.")]
    PercentTooHigh,

    /// Negative percentage discount.
    #[error("Please enter positive percentage value")]
    NegativePercent,

    /// Negative fixed discount.
    #[error("Please enter positive discount amount")]
    NegativeAmount,

    /// Fixed discount larger than the untaxed amount.
    #[error("Please enter discount amount less than actual amount")]
    AmountExceedsUntaxed,

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value outside the range the ledger can carry.
    #[error("{field} exceeds {max}")]
    TooLarge { field: String, max: Money },

    /// Invalid format (e.g., unparsable rate, unknown discount type).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Currency Error
// =============================================================================

/// Currency conversion errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    /// No rate is known for the currency on or before the date.
    #[error("No exchange rate for {currency} on or before {date}")]
    RateNotFound { currency: CurrencyCode, date: NaiveDate },

    /// A rate of zero or below was supplied.
    #[error("Exchange rate for {currency} must be positive")]
    InvalidRate { currency: CurrencyCode },

    /// Converted amount does not fit in cents.
    #[error("Converted amount overflows")]
    Overflow,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_messages() {
        assert_eq!(
            ValidationError::PercentTooHigh.to_string(),
            "Please enter percentage value less than 100 %."
        );
        assert_eq!(
            ValidationError::AmountExceedsUntaxed.to_string(),
            "Please enter discount amount less than actual amount"
        );
    }

    #[test]
    fn test_locked_message() {
        let err = CoreError::DocumentLocked {
            document: "BILL/2026/0001".to_string(),
            state: MoveState::Posted,
        };
        assert_eq!(
            err.to_string(),
            "Document BILL/2026/0001 is posted, cannot perform operation"
        );
    }

    #[test]
    fn test_currency_change_messages() {
        let usd = CurrencyCode::new("USD").unwrap();
        let eur = CurrencyCode::new("EUR").unwrap();
        let err = CoreError::CompanyCurrencyChanged {
            document: "BILL/2026/0001".to_string(),
            booked: usd.clone(),
            configured: eur,
        };
        assert_eq!(
            err.to_string(),
            "Document BILL/2026/0001 is booked in USD, company currency is now EUR"
        );

        let err = CoreError::CompanyCurrencyLocked {
            company_id: "main".to_string(),
            currency: usd,
            entries: 2,
        };
        assert!(err.to_string().contains("2 journal entries in USD"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::NegativePercent.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
