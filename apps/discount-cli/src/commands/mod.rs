//! # CLI Commands
//!
//! One module per document family. Every handler returns the document it
//! touched; [`dispatch`] prints it as JSON.
//!
//! ## Command Tree
//! ```text
//! discount
//! ├── company  show | set
//! ├── account  add | list
//! ├── rate     add
//! ├── po       create | discount | show | bill
//! └── bill     show | discount | refund | post
//! ```

pub mod account;
pub mod bill;
pub mod company;
pub mod purchase;
pub mod rate;

use chrono::{NaiveDate, Utc};
use clap::{Subcommand, ValueEnum};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use tracing::debug;

use crate::error::{CliError, CliResult};
use discount_core::{CompanyDiscountConfig, DiscountType, Money, RateTable};
use discount_db::{Database, DbError};

// =============================================================================
// Command Tree
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Company discount settings
    #[command(subcommand)]
    Company(company::CompanyCommand),

    /// Chart of accounts
    #[command(subcommand)]
    Account(account::AccountCommand),

    /// Exchange rates against the company currency
    #[command(subcommand)]
    Rate(rate::RateCommand),

    /// Purchase orders
    #[command(subcommand)]
    Po(purchase::PurchaseCommand),

    /// Vendor bills and credit notes
    #[command(subcommand)]
    Bill(bill::BillCommand),
}

/// Runs one command and prints its result.
pub async fn dispatch(ctx: &AppContext, command: Command) -> CliResult<()> {
    let output = match command {
        Command::Company(cmd) => company::execute(ctx, cmd).await?,
        Command::Account(cmd) => account::execute(ctx, cmd).await?,
        Command::Rate(cmd) => rate::execute(ctx, cmd).await?,
        Command::Po(cmd) => purchase::execute(ctx, cmd).await?,
        Command::Bill(cmd) => bill::execute(ctx, cmd).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub(crate) fn to_output<T: Serialize>(value: &T) -> CliResult<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

// =============================================================================
// App Context
// =============================================================================

/// What every handler needs: the database and the company acted on.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub db: Database,
    pub company_id: String,
}

impl AppContext {
    pub fn new(db: Database, company_id: impl Into<String>) -> Self {
        AppContext {
            db,
            company_id: company_id.into(),
        }
    }

    /// Current discount settings of the company.
    pub async fn settings(&self) -> CliResult<CompanyDiscountConfig> {
        match self.db.company().require(&self.company_id).await {
            Ok(config) => Ok(config),
            Err(DbError::NotFound { .. }) => Err(CliError::NotConfigured(self.company_id.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// Settings together with the company's rate table.
    pub async fn settings_and_rates(&self) -> CliResult<(CompanyDiscountConfig, RateTable)> {
        let config = self.settings().await?;
        let rates = self.db.rates().load_table(&self.company_id, &config.currency).await?;
        debug!(company_id = %self.company_id, currency = %config.currency, "Loaded company settings");
        Ok((config, rates))
    }
}

// =============================================================================
// Shared Arguments
// =============================================================================

/// Discount type as typed on the command line; `none` clears the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiscountTypeArg {
    Percent,
    Amount,
    None,
}

impl From<DiscountTypeArg> for Option<DiscountType> {
    fn from(arg: DiscountTypeArg) -> Self {
        match arg {
            DiscountTypeArg::Percent => Some(DiscountType::Percent),
            DiscountTypeArg::Amount => Some(DiscountType::Amount),
            DiscountTypeArg::None => None,
        }
    }
}

/// Parses `"25"`, `"25.5"` or `"25.50"` into cents.
pub fn parse_money(s: &str) -> Result<Money, String> {
    let value = Decimal::from_str(s.trim()).map_err(|e| format!("invalid amount '{}': {}", s, e))?;
    let cents = value * Decimal::ONE_HUNDRED;
    if !cents.fract().is_zero() {
        return Err(format!("invalid amount '{}': at most two decimal places", s));
    }
    cents
        .to_i64()
        .map(Money::from_cents)
        .ok_or_else(|| format!("invalid amount '{}': out of range", s))
}

/// The given date or today.
pub(crate) fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use discount_core::{Account, AccountKind, CurrencyCode};
    use discount_db::DbConfig;

    pub const COMPANY: &str = "main";

    pub fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    pub fn eur() -> CurrencyCode {
        CurrencyCode::new("EUR").unwrap()
    }

    pub fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    /// In-memory database with an expense, tax, payable and discount account
    /// and discounts enabled in USD.
    pub async fn context() -> AppContext {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let accounts = [
            ("acc-exp", "6000", "Purchases", AccountKind::Expense),
            ("acc-tax", "2400", "Input VAT", AccountKind::Tax),
            ("acc-pay", "4010", "Vendors", AccountKind::Payable),
            ("acc-disc", "7600", "Purchase Discounts", AccountKind::Income),
        ];
        for (id, code, name, kind) in accounts {
            db.accounts()
                .insert(COMPANY, &Account::new(id, code, name, kind).unwrap())
                .await
                .unwrap();
        }

        let ctx = AppContext::new(db, COMPANY);
        company::set(
            &ctx,
            company::SetArgs {
                currency: Some(usd()),
                discount_account: Some("7600".into()),
                disable: false,
            },
        )
        .await
        .unwrap();
        ctx
    }
}
