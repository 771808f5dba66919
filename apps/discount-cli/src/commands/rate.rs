//! # Exchange Rate Commands
//!
//! A rate is the number of foreign units per company unit, effective from
//! its date until the next rate of the same currency.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use super::{date_or_today, to_output, AppContext};
use crate::error::CliResult;
use discount_core::{CurrencyCode, ExchangeRate, ValidationError};

#[derive(Debug, Subcommand)]
pub enum RateCommand {
    /// Record a rate
    Add(AddArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub currency: CurrencyCode,

    /// Foreign units per company unit, e.g. 0.92
    #[arg(long)]
    pub rate: Decimal,

    /// Effective date (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub async fn execute(ctx: &AppContext, command: RateCommand) -> CliResult<serde_json::Value> {
    match command {
        RateCommand::Add(args) => to_output(&add(ctx, args).await?),
    }
}

pub async fn add(ctx: &AppContext, args: AddArgs) -> CliResult<ExchangeRate> {
    let config = ctx.settings().await?;
    if args.currency == config.currency {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: format!("{} is the company currency", args.currency),
        }
        .into());
    }

    let rate = ExchangeRate {
        currency: args.currency,
        date: date_or_today(args.date),
        rate: args.rate,
    };
    ctx.db.rates().upsert(&ctx.company_id, &rate).await?;
    info!(currency = %rate.currency, date = %rate.date, rate = %rate.rate, "Exchange rate recorded");
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, date, eur, usd};
    use crate::error::CliError;

    #[tokio::test]
    async fn test_add_rate() {
        let ctx = context().await;
        let rate = add(&ctx, AddArgs { currency: eur(), rate: Decimal::new(5, 1), date: Some(date(1, 1)) })
            .await
            .unwrap();
        assert_eq!(ctx.db.rates().list(&ctx.company_id).await.unwrap(), vec![rate]);
    }

    #[tokio::test]
    async fn test_company_currency_rejected() {
        let ctx = context().await;
        let err = add(&ctx, AddArgs { currency: usd(), rate: Decimal::ONE, date: None })
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Core(_)));
    }

    #[tokio::test]
    async fn test_non_positive_rate_rejected() {
        let ctx = context().await;
        let err = add(&ctx, AddArgs { currency: eur(), rate: Decimal::ZERO, date: None })
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
