//! # Company Settings
//!
//! The company-level discount configuration and the chart-of-accounts
//! entries the documents post to.
//!
//! The configuration is an explicit value handed to every operation that
//! needs it; documents only keep read-only mirrors of it.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{AccountKind, CurrencyCode};
use crate::validation::{validate_name, ValidationResult};

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        kind: AccountKind,
    ) -> ValidationResult<Self> {
        let account = Account {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            kind,
        };
        validate_name("account code", &account.code)?;
        validate_name("account name", &account.name)?;
        Ok(account)
    }
}

/// Discount settings of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDiscountConfig {
    pub company_id: String,

    /// Accounting currency of the company.
    pub currency: CurrencyCode,

    /// Whether discounts are offered on purchase documents.
    pub enable_discount: bool,

    /// Account receiving the discount line of vendor bills.
    pub purchase_discount_account: Option<Account>,
}

impl CompanyDiscountConfig {
    /// Settings with discounts switched off.
    pub fn new(company_id: impl Into<String>, currency: CurrencyCode) -> Self {
        CompanyDiscountConfig {
            company_id: company_id.into(),
            currency,
            enable_discount: false,
            purchase_discount_account: None,
        }
    }

    /// Turns discounts on and sets the discount account.
    pub fn with_discount_account(mut self, account: Account) -> ValidationResult<Self> {
        self.enable_discount = true;
        self.purchase_discount_account = Some(account);
        self.validate()?;
        Ok(self)
    }

    /// The discount account may not be a payable account, otherwise the
    /// discount line would be mistaken for the vendor balance.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(account) = &self.purchase_discount_account {
            if account.kind == AccountKind::Payable {
                return Err(ValidationError::InvalidFormat {
                    field: "purchase_discount_account".to_string(),
                    reason: format!("account {} is a payable account", account.code),
                });
            }
        }
        Ok(())
    }

    pub fn discount_account_id(&self) -> Option<&str> {
        self.purchase_discount_account.as_ref().map(|a| a.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    #[test]
    fn test_defaults_disabled() {
        let config = CompanyDiscountConfig::new("main", usd());
        assert!(!config.enable_discount);
        assert_eq!(config.discount_account_id(), None);
    }

    #[test]
    fn test_discount_account_enables() {
        let account = Account::new("acc-1", "4110", "Purchase Discounts", AccountKind::Income).unwrap();
        let config = CompanyDiscountConfig::new("main", usd())
            .with_discount_account(account)
            .unwrap();
        assert!(config.enable_discount);
        assert_eq!(config.discount_account_id(), Some("acc-1"));
    }

    #[test]
    fn test_rejects_payable_discount_account() {
        let account = Account::new("acc-2", "2100", "Vendors", AccountKind::Payable).unwrap();
        assert!(CompanyDiscountConfig::new("main", usd())
            .with_discount_account(account)
            .is_err());
    }
}
