//! # Vendor Bill Commands
//!
//! Every edit loads the bill, runs it through the recompute pipeline with
//! the current company settings and rates, and saves it in one transaction.
//! The discount line outcome is logged and printed with the bill.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;

use super::{date_or_today, to_output, AppContext, DiscountTypeArg};
use crate::error::CliResult;
use discount_core::{DiscountRate, SyncOutcome, VendorBill};

#[derive(Debug, Subcommand)]
pub enum BillCommand {
    /// Print a bill with its journal lines
    Show {
        /// Bill name, e.g. BILL/2026/0001
        name: String,
    },

    /// Change the discount of a draft bill
    Discount(DiscountArgs),

    /// Create the draft credit note reversing a bill
    Refund {
        name: String,

        /// Credit note date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Post a balanced draft bill
    Post { name: String },
}

#[derive(Debug, Args)]
pub struct DiscountArgs {
    pub name: String,

    #[arg(long = "type", value_enum)]
    pub discount_type: DiscountTypeArg,

    /// Percent (10 = 10%) or amount in bill currency (20 = 20.00)
    #[arg(long = "rate", default_value = "0", allow_hyphen_values = true)]
    pub discount_rate: DiscountRate,
}

/// A bill and what its last edit did to the discount line.
#[derive(Debug, Serialize)]
pub struct BillReport {
    pub bill: VendorBill,
    pub outcome: SyncOutcome,
}

pub async fn execute(ctx: &AppContext, command: BillCommand) -> CliResult<serde_json::Value> {
    match command {
        BillCommand::Show { name } => to_output(&show(ctx, &name).await?),
        BillCommand::Discount(args) => to_output(&discount(ctx, args).await?),
        BillCommand::Refund { name, date } => to_output(&refund(ctx, &name, date).await?),
        BillCommand::Post { name } => to_output(&post(ctx, &name).await?),
    }
}

pub async fn show(ctx: &AppContext, name: &str) -> CliResult<VendorBill> {
    let config = ctx.settings().await?;
    let mut bill = ctx.db.bills().get_by_name(&ctx.company_id, name).await?;
    bill.refresh_company_settings(&config);
    Ok(bill)
}

pub async fn discount(ctx: &AppContext, args: DiscountArgs) -> CliResult<BillReport> {
    let (config, rates) = ctx.settings_and_rates().await?;
    let repo = ctx.db.bills();

    let mut bill = repo.get_by_name(&ctx.company_id, &args.name).await?;
    let outcome = bill.set_discount(args.discount_type.into(), args.discount_rate, &config, &rates)?;
    repo.save(&bill).await?;

    info!(
        bill = %bill.name,
        discount = %bill.discount_amount,
        total = %bill.amount_total,
        outcome = ?outcome,
        "Bill discount changed"
    );
    Ok(BillReport { bill, outcome })
}

pub async fn refund(ctx: &AppContext, name: &str, date: Option<NaiveDate>) -> CliResult<VendorBill> {
    let (config, rates) = ctx.settings_and_rates().await?;
    let repo = ctx.db.bills();

    let origin = repo.get_by_name(&ctx.company_id, name).await?;
    let date = date_or_today(date);
    let refund_name = repo.next_name(&ctx.company_id, origin.kind.reversed(), date).await?;
    let refund = origin.reverse(refund_name, date, &config, &rates)?;
    repo.save(&refund).await?;

    info!(
        origin = %origin.name,
        refund = %refund.name,
        discount = %refund.discount_amount,
        total_signed = %refund.amount_total_signed,
        "Credit note created"
    );
    Ok(refund)
}

pub async fn post(ctx: &AppContext, name: &str) -> CliResult<VendorBill> {
    let repo = ctx.db.bills();
    let mut bill = repo.get_by_name(&ctx.company_id, name).await?;
    bill.post()?;
    repo.save(&bill).await?;

    info!(bill = %bill.name, total = %bill.amount_total, "Bill posted");
    Ok(bill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchase::{self, parse_order_line, CreateArgs};
    use crate::commands::test_support::{context, date};
    use crate::error::CliError;
    use discount_core::{CoreError, LineKind, Money, MoveKind, MoveState};

    /// PO0001 for 100.00 + 10% tax, billed as BILL/2026/0001 without discount.
    async fn draft_bill(ctx: &AppContext) -> VendorBill {
        purchase::create(
            ctx,
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
        purchase::bill(ctx, "PO0001", Some(date(5, 2))).await.unwrap()
    }

    fn discount_args(discount_type: DiscountTypeArg, rate: i64) -> DiscountArgs {
        DiscountArgs {
            name: "BILL/2026/0001".into(),
            discount_type,
            discount_rate: DiscountRate::from_whole(rate),
        }
    }

    #[tokio::test]
    async fn test_discount_creates_then_updates_line() {
        let ctx = context().await;
        let bill = draft_bill(&ctx).await;
        assert!(bill.discount_line().is_none());

        let report = discount(&ctx, discount_args(DiscountTypeArg::Percent, 10)).await.unwrap();
        let line_id = match report.outcome {
            SyncOutcome::Created { line_id } => line_id,
            other => panic!("expected a new discount line, got {:?}", other),
        };
        assert_eq!(report.bill.amount_total, Money::from_cents(9900));

        let report = discount(&ctx, discount_args(DiscountTypeArg::Amount, 20)).await.unwrap();
        assert_eq!(report.outcome, SyncOutcome::Updated { line_id: line_id.clone() });

        let stored = show(&ctx, "BILL/2026/0001").await.unwrap();
        let line = stored.discount_line().unwrap();
        assert_eq!(line.id, line_id);
        assert_eq!(line.credit, Money::from_cents(2000));
        assert_eq!(stored.amount_total, Money::from_cents(9000));
        assert_eq!(stored.lines.iter().filter(|l| l.kind == LineKind::Discount).count(), 1);
        assert!(stored.enable_discount);
    }

    #[tokio::test]
    async fn test_clearing_removes_line() {
        let ctx = context().await;
        draft_bill(&ctx).await;
        discount(&ctx, discount_args(DiscountTypeArg::Percent, 10)).await.unwrap();

        let report = discount(&ctx, discount_args(DiscountTypeArg::Percent, 0)).await.unwrap();
        assert!(matches!(report.outcome, SyncOutcome::Removed { .. }));
        assert!(show(&ctx, "BILL/2026/0001").await.unwrap().discount_line().is_none());
    }

    #[tokio::test]
    async fn test_amount_above_untaxed_rejected() {
        let ctx = context().await;
        draft_bill(&ctx).await;

        let err = discount(&ctx, discount_args(DiscountTypeArg::Amount, 150)).await.unwrap_err();
        assert!(matches!(err, CliError::Core(CoreError::Validation(_))));
        assert_eq!(show(&ctx, "BILL/2026/0001").await.unwrap().amount_total, Money::from_cents(11000));
    }

    #[tokio::test]
    async fn test_refund_carries_discount() {
        let ctx = context().await;
        draft_bill(&ctx).await;
        discount(&ctx, discount_args(DiscountTypeArg::Percent, 15)).await.unwrap();

        let refund = refund(&ctx, "BILL/2026/0001", Some(date(6, 1))).await.unwrap();
        assert_eq!(refund.kind, MoveKind::VendorRefund);
        assert_eq!(refund.discount_amount, Money::from_cents(1650));
        assert_eq!(refund.amount_total_signed, Money::from_cents(-9350));
        assert_eq!(refund.discount_line().unwrap().debit, Money::from_cents(1650));

        let stored = show(&ctx, &refund.name).await.unwrap();
        assert_eq!(stored.reversed_entry_id, refund.reversed_entry_id);
    }

    #[tokio::test]
    async fn test_post_locks_bill() {
        let ctx = context().await;
        draft_bill(&ctx).await;
        discount(&ctx, discount_args(DiscountTypeArg::Percent, 10)).await.unwrap();

        let posted = post(&ctx, "BILL/2026/0001").await.unwrap();
        assert_eq!(posted.state, MoveState::Posted);

        let err = discount(&ctx, discount_args(DiscountTypeArg::Percent, 5)).await.unwrap_err();
        assert!(matches!(err, CliError::Core(CoreError::DocumentLocked { .. })));
        assert!(matches!(
            post(&ctx, "BILL/2026/0001").await,
            Err(CliError::Core(CoreError::DocumentLocked { .. }))
        ));
    }
}
