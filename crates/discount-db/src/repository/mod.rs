//! # Repository Module
//!
//! Database repository implementations for the discount ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Load → Recompute → Commit                            │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.bills().get_by_name("main", "BILL/2026/0001")              │
//! │       ▼                                                                 │
//! │  VendorBill (in memory, discount-core)                                 │
//! │       │                                                                 │
//! │       │  bill.set_discount(..)  ← all line edits happen here           │
//! │       ▼                                                                 │
//! │  db.bills().save(&bill)                                                │
//! │       │                                                                 │
//! │       │  one transaction: upsert header, replace lines                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories never compute anything; they only map rows to the core
//! types and back.
//!
//! ## Available Repositories
//!
//! - [`company::CompanyRepository`] - Company discount settings
//! - [`account::AccountRepository`] - Chart of accounts
//! - [`rate::RateRepository`] - Dated exchange rates
//! - [`purchase::PurchaseOrderRepository`] - Purchase orders and lines
//! - [`bill::BillRepository`] - Journal entries and lines

pub mod account;
pub mod bill;
pub mod company;
pub mod purchase;
pub mod rate;

use discount_core::CurrencyCode;

use crate::error::{DbError, DbResult};

/// Parses a stored currency code.
pub(crate) fn currency_from_db(code: &str) -> DbResult<CurrencyCode> {
    CurrencyCode::new(code).map_err(|e| DbError::invalid("currency", e))
}

/// Next free sequence number for names built as `<prefix><number>`.
///
/// Looks at the highest existing number so gaps left by deleted rows are
/// never reused.
pub(crate) fn next_sequence(existing: &[String], prefix: &str) -> u32 {
    existing
        .iter()
        .filter_map(|name| name.strip_prefix(prefix))
        .filter_map(|rest| rest.parse::<u32>().ok())
        .max()
        .map_or(1, |n| n + 1)
}

#[cfg(test)]
pub(crate) mod test_support {
    use discount_core::{Account, AccountKind, CompanyDiscountConfig, CurrencyCode};

    use crate::pool::{Database, DbConfig};

    pub const COMPANY: &str = "main";

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    pub fn eur() -> CurrencyCode {
        CurrencyCode::new("EUR").unwrap()
    }

    pub struct Chart {
        pub expense: Account,
        pub tax: Account,
        pub payable: Account,
        pub discount: Account,
    }

    /// Inserts a small chart of accounts and enabled discount settings.
    pub async fn seeded() -> (Database, Chart, CompanyDiscountConfig) {
        let db = database().await;
        let chart = Chart {
            expense: Account::new("acc-exp", "6000", "Purchases", AccountKind::Expense).unwrap(),
            tax: Account::new("acc-tax", "4456", "Input VAT", AccountKind::Tax).unwrap(),
            payable: Account::new("acc-pay", "4010", "Vendors", AccountKind::Payable).unwrap(),
            discount: Account::new("acc-disc", "7090", "Purchase Discounts", AccountKind::Income).unwrap(),
        };
        for account in [&chart.expense, &chart.tax, &chart.payable, &chart.discount] {
            db.accounts().insert(COMPANY, account).await.unwrap();
        }

        let config = CompanyDiscountConfig::new(COMPANY, usd())
            .with_discount_account(chart.discount.clone())
            .unwrap();
        db.company().save(&config).await.unwrap();
        (db, chart, config)
    }
}
