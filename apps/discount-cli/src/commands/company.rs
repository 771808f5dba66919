//! # Company Commands
//!
//! `company show` and `company set`. Changing the settings does not touch
//! stored documents: their mirrors are refreshed whenever they are loaded.
//! The currency is the exception; it is locked once a journal entry exists.

use clap::{Args, Subcommand};
use tracing::info;

use super::{to_output, AppContext};
use crate::error::CliResult;
use discount_core::{CompanyDiscountConfig, CoreError, CurrencyCode, ValidationError};

#[derive(Debug, Subcommand)]
pub enum CompanyCommand {
    /// Print the discount settings
    Show,

    /// Change the discount settings
    Set(SetArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Accounting currency, required the first time
    #[arg(long)]
    pub currency: Option<CurrencyCode>,

    /// Code of the account receiving vendor bill discount lines; enables discounts
    #[arg(long, conflicts_with = "disable")]
    pub discount_account: Option<String>,

    /// Switch discounts off and clear the discount account
    #[arg(long)]
    pub disable: bool,
}

pub async fn execute(ctx: &AppContext, command: CompanyCommand) -> CliResult<serde_json::Value> {
    match command {
        CompanyCommand::Show => to_output(&ctx.settings().await?),
        CompanyCommand::Set(args) => to_output(&set(ctx, args).await?),
    }
}

/// Saves new settings, keeping whatever the arguments leave out.
pub async fn set(ctx: &AppContext, args: SetArgs) -> CliResult<CompanyDiscountConfig> {
    let current = ctx.db.company().get(&ctx.company_id).await?;

    let currency = match (args.currency, &current) {
        (Some(currency), Some(current)) if currency != current.currency => {
            let entries = ctx.db.bills().count(&ctx.company_id).await?;
            if entries > 0 {
                return Err(CoreError::CompanyCurrencyLocked {
                    company_id: ctx.company_id.clone(),
                    currency: current.currency.clone(),
                    entries,
                }
                .into());
            }
            currency
        }
        (Some(currency), _) => currency,
        (None, Some(current)) => current.currency.clone(),
        (None, None) => {
            return Err(ValidationError::Required {
                field: "currency".to_string(),
            }
            .into())
        }
    };

    let base = CompanyDiscountConfig::new(ctx.company_id.clone(), currency);
    let config = if args.disable {
        base
    } else if let Some(code) = args.discount_account {
        let account = ctx.db.accounts().get_by_code(&ctx.company_id, &code).await?;
        base.with_discount_account(account)?
    } else {
        match current.and_then(|c| c.purchase_discount_account) {
            Some(account) => base.with_discount_account(account)?,
            None => base,
        }
    };

    ctx.db.company().save(&config).await?;
    info!(
        company_id = %config.company_id,
        enable_discount = config.enable_discount,
        discount_account = ?config.discount_account_id(),
        "Company settings updated"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchase::{self, parse_order_line, CreateArgs};
    use crate::commands::test_support::{context, date, eur, usd};
    use crate::commands::DiscountTypeArg;
    use crate::error::CliError;
    use discount_core::{Account, AccountKind, DiscountRate};
    use discount_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_currency_required_first_time() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = AppContext::new(db, "fresh");
        let err = set(&ctx, SetArgs { currency: None, discount_account: None, disable: false })
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Core(_)));
        assert!(matches!(ctx.settings().await, Err(CliError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_account() {
        let ctx = context().await;
        let config = set(&ctx, SetArgs { currency: Some(eur()), discount_account: None, disable: false })
            .await
            .unwrap();
        assert_eq!(config.currency, eur());
        assert!(config.enable_discount);
        assert_eq!(config.discount_account_id(), Some("acc-disc"));
    }

    #[tokio::test]
    async fn test_currency_locked_once_bills_exist() {
        let ctx = context().await;
        purchase::create(
            &ctx,
            CreateArgs {
                partner: "Acme Supplies".into(),
                currency: None,
                date: Some(date(5, 1)),
                lines: vec![parse_order_line("Widgets,4,25.00,10").unwrap()],
                discount_type: DiscountTypeArg::Percent,
                discount_rate: DiscountRate::zero(),
            },
        )
        .await
        .unwrap();

        // orders alone book nothing
        let config = set(&ctx, SetArgs { currency: Some(eur()), discount_account: None, disable: false })
            .await
            .unwrap();
        assert_eq!(config.currency, eur());
        set(&ctx, SetArgs { currency: Some(usd()), discount_account: None, disable: false })
            .await
            .unwrap();

        purchase::bill(&ctx, "PO0001", Some(date(5, 2))).await.unwrap();
        let err = set(&ctx, SetArgs { currency: Some(eur()), discount_account: None, disable: false })
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Core(CoreError::CompanyCurrencyLocked { entries: 1, .. })));
        assert_eq!(ctx.settings().await.unwrap().currency, usd());

        // same currency or other settings still go through
        set(&ctx, SetArgs { currency: Some(usd()), discount_account: None, disable: true })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_disable() {
        let ctx = context().await;
        let config = set(&ctx, SetArgs { currency: None, discount_account: None, disable: true })
            .await
            .unwrap();
        assert_eq!(config.currency, usd());
        assert!(!config.enable_discount);
        assert!(ctx.settings().await.unwrap().purchase_discount_account.is_none());
    }

    #[tokio::test]
    async fn test_payable_account_rejected() {
        let ctx = context().await;
        let err = set(
            &ctx,
            SetArgs { currency: None, discount_account: Some("4010".into()), disable: false },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Core(_)));

        // unchanged
        let stored = ctx.settings().await.unwrap();
        assert_eq!(
            stored.purchase_discount_account,
            Some(Account::new("acc-disc", "7600", "Purchase Discounts", AccountKind::Income).unwrap())
        );
    }
}
