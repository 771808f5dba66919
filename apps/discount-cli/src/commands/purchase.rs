//! # Purchase Order Commands
//!
//! ```text
//! po create ──► PurchaseOrder::new + add_line + set_discount ──► save
//! po bill   ──► VendorBill::from_purchase_order ──► save bill
//! ```

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use tracing::info;

use super::{date_or_today, parse_money, to_output, AppContext, DiscountTypeArg};
use crate::error::CliResult;
use discount_core::{
    AccountKind, BillAccounts, CurrencyCode, DiscountRate, MoveKind, OrderLine, PurchaseOrder,
    TaxRate, VendorBill,
};

#[derive(Debug, Subcommand)]
pub enum PurchaseCommand {
    /// Create a purchase order
    Create(CreateArgs),

    /// Change the discount of an order
    Discount(DiscountArgs),

    /// Print an order and the bills created from it
    Show {
        /// Order name, e.g. PO0001
        name: String,
    },

    /// Create a draft vendor bill from an order
    Bill {
        name: String,

        /// Bill date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub partner: String,

    /// Order currency, the company currency when omitted
    #[arg(long)]
    pub currency: Option<CurrencyCode>,

    /// Order date (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// `description,quantity,unit price[,tax %]`, repeatable
    #[arg(long = "line", value_parser = parse_order_line)]
    pub lines: Vec<OrderLine>,

    #[arg(long = "type", value_enum, default_value = "percent")]
    pub discount_type: DiscountTypeArg,

    /// Percent (10 = 10%) or amount in order currency (20 = 20.00)
    #[arg(long = "rate", default_value = "0", allow_hyphen_values = true)]
    pub discount_rate: DiscountRate,
}

#[derive(Debug, Args)]
pub struct DiscountArgs {
    pub name: String,

    #[arg(long = "type", value_enum)]
    pub discount_type: DiscountTypeArg,

    #[arg(long = "rate", default_value = "0", allow_hyphen_values = true)]
    pub discount_rate: DiscountRate,
}

/// An order with the names of the bills created from it.
#[derive(Debug, Serialize)]
pub struct OrderReport {
    pub order: PurchaseOrder,
    pub bills: Vec<String>,
}

pub async fn execute(ctx: &AppContext, command: PurchaseCommand) -> CliResult<serde_json::Value> {
    match command {
        PurchaseCommand::Create(args) => to_output(&create(ctx, args).await?),
        PurchaseCommand::Discount(args) => to_output(&discount(ctx, args).await?),
        PurchaseCommand::Show { name } => to_output(&show(ctx, &name).await?),
        PurchaseCommand::Bill { name, date } => to_output(&bill(ctx, &name, date).await?),
    }
}

pub async fn create(ctx: &AppContext, args: CreateArgs) -> CliResult<PurchaseOrder> {
    let config = ctx.settings().await?;
    let repo = ctx.db.purchase_orders();

    let name = repo.next_name(&ctx.company_id).await?;
    let currency = args.currency.unwrap_or_else(|| config.currency.clone());
    let mut order = PurchaseOrder::new(name, args.partner, date_or_today(args.date), currency, &config)?;
    for line in args.lines {
        order.add_line(line, &config);
    }
    order.set_discount(args.discount_type.into(), args.discount_rate, &config)?;

    repo.save(&order).await?;
    info!(
        name = %order.name,
        lines = order.lines.len(),
        discount = %order.discount_amount,
        total = %order.amount_total,
        "Purchase order created"
    );
    Ok(order)
}

pub async fn discount(ctx: &AppContext, args: DiscountArgs) -> CliResult<PurchaseOrder> {
    let config = ctx.settings().await?;
    let repo = ctx.db.purchase_orders();

    let mut order = repo.get_by_name(&ctx.company_id, &args.name).await?;
    let totals = order.set_discount(args.discount_type.into(), args.discount_rate, &config)?;
    repo.save(&order).await?;

    info!(
        name = %order.name,
        discount = %totals.discount_amount,
        total = %totals.amount_total,
        "Purchase order discount changed"
    );
    Ok(order)
}

pub async fn show(ctx: &AppContext, name: &str) -> CliResult<OrderReport> {
    let config = ctx.settings().await?;
    let mut order = ctx.db.purchase_orders().get_by_name(&ctx.company_id, name).await?;
    order.refresh_company_settings(&config);

    let bills = ctx
        .db
        .bills()
        .list_for_order(&order.id)
        .await?
        .into_iter()
        .map(|b| b.name)
        .collect();
    Ok(OrderReport { order, bills })
}

pub async fn bill(ctx: &AppContext, name: &str, date: Option<NaiveDate>) -> CliResult<VendorBill> {
    let (config, rates) = ctx.settings_and_rates().await?;
    let order = ctx.db.purchase_orders().get_by_name(&ctx.company_id, name).await?;

    let accounts = ctx.db.accounts();
    let bill_accounts = BillAccounts {
        expense: accounts.first_of_kind(&ctx.company_id, AccountKind::Expense).await?,
        tax: accounts.first_of_kind(&ctx.company_id, AccountKind::Tax).await?,
        payable: accounts.first_of_kind(&ctx.company_id, AccountKind::Payable).await?,
    };

    let date = date_or_today(date);
    let bill_name = ctx.db.bills().next_name(&ctx.company_id, MoveKind::VendorBill, date).await?;
    let bill = VendorBill::from_purchase_order(&order, bill_name, date, &bill_accounts, &config, &rates)?;
    ctx.db.bills().save(&bill).await?;

    info!(
        order = %order.name,
        bill = %bill.name,
        discount = %bill.discount_amount,
        discount_line = bill.discount_line().is_some(),
        "Vendor bill created from purchase order"
    );
    Ok(bill)
}

/// Parses `description,quantity,unit price[,tax %]`.
pub fn parse_order_line(s: &str) -> Result<OrderLine, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let (description, quantity, price, tax) = match parts.as_slice() {
        [d, q, p] => (*d, *q, *p, None),
        [d, q, p, t] => (*d, *q, *p, Some(*t)),
        _ => return Err(format!("expected 'description,quantity,price[,tax %]', got '{}'", s)),
    };

    let quantity: i64 = quantity
        .parse()
        .map_err(|_| format!("invalid quantity '{}'", quantity))?;
    let price = parse_money(price)?;
    let tax_rate = match tax {
        Some(tax) => parse_tax_percent(tax)?,
        None => TaxRate::zero(),
    };

    OrderLine::new(description, quantity, price, tax_rate).map_err(|e| e.to_string())
}

fn parse_tax_percent(s: &str) -> Result<TaxRate, String> {
    let bps = Decimal::from_str(s)
        .ok()
        .map(|pct| pct * Decimal::ONE_HUNDRED)
        .filter(|bps| bps.fract().is_zero() && !bps.is_sign_negative())
        .and_then(|bps| bps.to_u32())
        .ok_or_else(|| format!("invalid tax percent '{}'", s))?;
    Ok(TaxRate::from_bps(bps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, date, eur};
    use crate::commands::rate;
    use crate::error::CliError;
    use discount_core::{DiscountType, Money};

    fn widgets() -> OrderLine {
        parse_order_line("Widgets,4,25.00,10").unwrap()
    }

    fn create_args(discount_type: DiscountTypeArg, rate: i64) -> CreateArgs {
        CreateArgs {
            partner: "Acme Supplies".into(),
            currency: None,
            date: Some(date(5, 1)),
            lines: vec![widgets()],
            discount_type,
            discount_rate: DiscountRate::from_whole(rate),
        }
    }

    #[test]
    fn test_parse_order_line() {
        let line = widgets();
        assert_eq!(line.description, "Widgets");
        assert_eq!(line.quantity, 4);
        assert_eq!(line.price_unit, Money::from_cents(2500));
        assert_eq!(line.tax_rate, TaxRate::from_bps(1000));

        assert_eq!(parse_order_line("Bolts,2,1.5").unwrap().tax_rate, TaxRate::zero());
        assert!(parse_order_line("Bolts,2").is_err());
        assert!(parse_order_line("Bolts,x,1").is_err());
        assert!(parse_order_line("Bolts,2,1,-5").is_err());

        let err = parse_order_line("X,1000000000,99999999999").unwrap_err();
        assert!(err.contains("line amount exceeds"), "{}", err);
    }

    #[tokio::test]
    async fn test_create_with_percent() {
        let ctx = context().await;
        let order = create(&ctx, create_args(DiscountTypeArg::Percent, 10)).await.unwrap();

        assert_eq!(order.name, "PO0001");
        assert_eq!(order.discount_amount, Money::from_cents(1100));
        assert_eq!(order.amount_total, Money::from_cents(9900));
        assert!(order.enable_discount);
    }

    #[tokio::test]
    async fn test_discount_change_and_rejection() {
        let ctx = context().await;
        create(&ctx, create_args(DiscountTypeArg::Percent, 0)).await.unwrap();

        let order = discount(
            &ctx,
            DiscountArgs {
                name: "PO0001".into(),
                discount_type: DiscountTypeArg::Amount,
                discount_rate: DiscountRate::from_whole(20),
            },
        )
        .await
        .unwrap();
        assert_eq!(order.discount_type, Some(DiscountType::Amount));
        assert_eq!(order.amount_total, Money::from_cents(9000));

        let err = discount(
            &ctx,
            DiscountArgs {
                name: "PO0001".into(),
                discount_type: DiscountTypeArg::Percent,
                discount_rate: DiscountRate::from_whole(150),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Core(_)));

        // stored order unchanged
        let stored = show(&ctx, "PO0001").await.unwrap().order;
        assert_eq!(stored.amount_total, Money::from_cents(9000));
    }

    #[tokio::test]
    async fn test_bill_from_order() {
        let ctx = context().await;
        create(&ctx, create_args(DiscountTypeArg::Percent, 10)).await.unwrap();

        let bill = bill(&ctx, "PO0001", Some(date(5, 2))).await.unwrap();
        assert_eq!(bill.name, "BILL/2026/0001");
        assert_eq!(bill.discount_amount, Money::from_cents(1100));
        assert_eq!(bill.amount_total, Money::from_cents(9900));
        assert_eq!(bill.discount_line().unwrap().credit, Money::from_cents(1100));

        let report = show(&ctx, "PO0001").await.unwrap();
        assert_eq!(report.bills, vec!["BILL/2026/0001".to_string()]);
    }

    #[tokio::test]
    async fn test_foreign_bill_needs_rate() {
        let ctx = context().await;
        let mut args = create_args(DiscountTypeArg::Percent, 10);
        args.currency = Some(eur());
        create(&ctx, args).await.unwrap();

        let err = bill(&ctx, "PO0001", Some(date(5, 2))).await.unwrap_err();
        assert!(matches!(err, CliError::Core(_)));
        assert!(ctx.db.bills().list(&ctx.company_id).await.unwrap().is_empty());

        rate::add(
            &ctx,
            rate::AddArgs { currency: eur(), rate: Decimal::new(5, 1), date: Some(date(1, 1)) },
        )
        .await
        .unwrap();
        let bill = bill(&ctx, "PO0001", Some(date(5, 2))).await.unwrap();
        let line = bill.discount_line().unwrap();
        assert_eq!(line.credit, Money::from_cents(2200));
        assert_eq!(line.amount_currency, Money::from_cents(-1100));
    }
}
