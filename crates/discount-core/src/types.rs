//! # Domain Types
//!
//! Small value types shared by the calculator, the ledger and the document
//! adapters.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountType   │   │  DiscountRate   │   │    TaxRate      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Percent        │   │  hundredths i64 │   │  bps (u32)      │       │
//! │  │  Amount         │   │  1000 = 10 / 10%│   │  825 = 8.25%    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MoveKind     │   │   MoveState     │   │  AccountKind    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  VendorBill     │   │  Draft          │   │  Payable        │       │
//! │  │  VendorRefund   │   │  Posted         │   │  Expense, Tax   │       │
//! │  │  Customer*      │   │  Cancelled      │   │  ...            │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::ValidationResult;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 825 bps = 8.25%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Discount Type
// =============================================================================

/// How a document's `discount_rate` is interpreted.
///
/// Documents hold an `Option<DiscountType>`; `None` is the "unset" state in
/// which rate and amount are forced to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Rate is a percentage of untaxed + tax.
    #[default]
    Percent,
    /// Rate is a fixed amount in document currency.
    Amount,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percent => "percent",
            DiscountType::Amount => "amount",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" | "percentage" | "%" => Ok(DiscountType::Percent),
            "amount" | "fixed" => Ok(DiscountType::Amount),
            other => Err(ValidationError::InvalidFormat {
                field: "discount_type".to_string(),
                reason: format!("unknown discount type '{}', expected percent or amount", other),
            }),
        }
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A discount rate in hundredths.
///
/// For [`DiscountType::Percent`] the unit is a hundredth of a percent
/// (`1000` = 10%); for [`DiscountType::Amount`] it is a cent of document
/// currency (`2000` = 20.00). The value is signed so that a negative entry
/// can reach the validator and be rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct DiscountRate(i64);

impl DiscountRate {
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        DiscountRate(hundredths)
    }

    /// Whole units: `from_whole(10)` is 10% or 10.00.
    #[inline]
    pub const fn from_whole(units: i64) -> Self {
        DiscountRate(units * 100)
    }

    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// The rate read as a fixed amount of money.
    #[inline]
    pub const fn as_money(&self) -> Money {
        Money::from_cents(self.0)
    }

    /// The rate as a decimal (`1250` → `12.5`).
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2).normalize()
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for DiscountRate {
    type Err = ValidationError;

    /// Parses `"10"`, `"12.5"`, `"-5"`; more than two decimals is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "discount_rate".to_string(),
            reason: reason.to_string(),
        };

        let value = Decimal::from_str(s.trim()).map_err(|_| invalid("not a number"))?;
        let hundredths = value * Decimal::ONE_HUNDRED;
        if !hundredths.fract().is_zero() {
            return Err(invalid("at most two decimal places"));
        }
        hundredths
            .to_i64()
            .map(DiscountRate)
            .ok_or_else(|| invalid("out of range"))
    }
}

// =============================================================================
// Currency Code
// =============================================================================

/// ISO 4217 currency code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Validates and normalizes a currency code.
    ///
    /// ## Example
    /// ```rust
    /// use discount_core::types::CurrencyCode;
    ///
    /// assert_eq!(CurrencyCode::new("eur").unwrap().as_str(), "EUR");
    /// assert!(CurrencyCode::new("EURO").is_err());
    /// ```
    pub fn new(code: &str) -> ValidationResult<Self> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::Required {
                field: "currency".to_string(),
            });
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidFormat {
                field: "currency".to_string(),
                reason: "must be a three-letter ISO 4217 code".to_string(),
            });
        }
        Ok(CurrencyCode(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurrencyCode::new(s)
    }
}

// =============================================================================
// Move Kind
// =============================================================================

/// The kind of accounting document.
///
/// Only the purchase kinds get a discount line; customer documents have
/// their totals computed but their lines left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    VendorBill,
    VendorRefund,
    CustomerInvoice,
    CustomerRefund,
}

impl MoveKind {
    /// Vendor bill or vendor credit note.
    pub fn is_purchase(&self) -> bool {
        matches!(self, MoveKind::VendorBill | MoveKind::VendorRefund)
    }

    pub fn is_refund(&self) -> bool {
        matches!(self, MoveKind::VendorRefund | MoveKind::CustomerRefund)
    }

    /// Sign turning the summed balance of invoice lines into a positive
    /// untaxed amount. Outbound documents (vendor bills, customer refunds)
    /// carry their product lines as debits.
    pub fn untaxed_sign(&self) -> i64 {
        match self {
            MoveKind::VendorBill | MoveKind::CustomerRefund => 1,
            MoveKind::VendorRefund | MoveKind::CustomerInvoice => -1,
        }
    }

    /// Sign of `amount_total_signed`: refunds count negative.
    pub fn total_sign(&self) -> i64 {
        if self.is_refund() {
            -1
        } else {
            1
        }
    }

    /// The kind of the document that reverses this one.
    pub fn reversed(&self) -> MoveKind {
        match self {
            MoveKind::VendorBill => MoveKind::VendorRefund,
            MoveKind::VendorRefund => MoveKind::VendorBill,
            MoveKind::CustomerInvoice => MoveKind::CustomerRefund,
            MoveKind::CustomerRefund => MoveKind::CustomerInvoice,
        }
    }

    /// Prefix used in generated document names.
    pub fn prefix(&self) -> &'static str {
        match self {
            MoveKind::VendorBill => "BILL",
            MoveKind::VendorRefund => "RBILL",
            MoveKind::CustomerInvoice => "INV",
            MoveKind::CustomerRefund => "RINV",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveKind::VendorBill => "vendor_bill",
            MoveKind::VendorRefund => "vendor_refund",
            MoveKind::CustomerInvoice => "customer_invoice",
            MoveKind::CustomerRefund => "customer_refund",
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vendor_bill" | "in_invoice" | "bill" => Ok(MoveKind::VendorBill),
            "vendor_refund" | "in_refund" => Ok(MoveKind::VendorRefund),
            "customer_invoice" | "out_invoice" | "invoice" => Ok(MoveKind::CustomerInvoice),
            "customer_refund" | "out_refund" => Ok(MoveKind::CustomerRefund),
            other => Err(ValidationError::InvalidFormat {
                field: "kind".to_string(),
                reason: format!("unknown document kind '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Move State
// =============================================================================

/// Lifecycle state of an accounting document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    /// Lines may still change.
    #[default]
    Draft,
    /// Entered in the ledger; frozen.
    Posted,
    Cancelled,
}

impl MoveState {
    pub fn is_editable(&self) -> bool {
        matches!(self, MoveState::Draft)
    }
}

impl fmt::Display for MoveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveState::Draft => write!(f, "draft"),
            MoveState::Posted => write!(f, "posted"),
            MoveState::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =============================================================================
// Account Kind
// =============================================================================

/// Account classification used to partition journal lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Payable,
    Receivable,
    Expense,
    Income,
    Tax,
    Asset,
    Liability,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Payable => "payable",
            AccountKind::Receivable => "receivable",
            AccountKind::Expense => "expense",
            AccountKind::Income => "income",
            AccountKind::Tax => "tax",
            AccountKind::Asset => "asset",
            AccountKind::Liability => "liability",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "payable" => Ok(AccountKind::Payable),
            "receivable" => Ok(AccountKind::Receivable),
            "expense" => Ok(AccountKind::Expense),
            "income" => Ok(AccountKind::Income),
            "tax" => Ok(AccountKind::Tax),
            "asset" => Ok(AccountKind::Asset),
            "liability" => Ok(AccountKind::Liability),
            other => Err(ValidationError::InvalidFormat {
                field: "account kind".to_string(),
                reason: format!("unknown account kind '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_type_default_is_percent() {
        assert_eq!(DiscountType::default(), DiscountType::Percent);
    }

    #[test]
    fn test_discount_type_parsing() {
        assert_eq!("Percent".parse::<DiscountType>().unwrap(), DiscountType::Percent);
        assert_eq!("amount".parse::<DiscountType>().unwrap(), DiscountType::Amount);
        assert!("half".parse::<DiscountType>().is_err());
    }

    #[test]
    fn test_discount_rate_parsing() {
        assert_eq!("10".parse::<DiscountRate>().unwrap().hundredths(), 1000);
        assert_eq!("12.5".parse::<DiscountRate>().unwrap().hundredths(), 1250);
        assert_eq!("-5".parse::<DiscountRate>().unwrap().hundredths(), -500);
        assert!("1.005".parse::<DiscountRate>().is_err());
        assert!("ten".parse::<DiscountRate>().is_err());
    }

    #[test]
    fn test_discount_rate_display() {
        assert_eq!(DiscountRate::from_hundredths(1000).to_string(), "10");
        assert_eq!(DiscountRate::from_hundredths(1250).to_string(), "12.5");
        assert_eq!(DiscountRate::from_whole(20).as_money().cents(), 2000);
    }

    #[test]
    fn test_move_kind_signs() {
        assert_eq!(MoveKind::VendorBill.untaxed_sign(), 1);
        assert_eq!(MoveKind::VendorRefund.untaxed_sign(), -1);
        assert_eq!(MoveKind::VendorRefund.total_sign(), -1);
        assert_eq!(MoveKind::VendorBill.reversed(), MoveKind::VendorRefund);
        assert!(MoveKind::VendorRefund.is_purchase());
        assert!(!MoveKind::CustomerInvoice.is_purchase());
    }

    #[test]
    fn test_move_state_default() {
        assert_eq!(MoveState::default(), MoveState::Draft);
        assert!(MoveState::Draft.is_editable());
        assert!(!MoveState::Posted.is_editable());
    }

    #[test]
    fn test_currency_code() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap().as_str(), "USD");
        assert!(CurrencyCode::new("").is_err());
        assert!(CurrencyCode::new("U$D").is_err());
    }
}
