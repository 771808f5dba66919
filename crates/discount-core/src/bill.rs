//! # Vendor Bill Adapter
//!
//! A journal entry (vendor bill, vendor credit note, or for totals only a
//! customer invoice/refund) carrying a document-level discount.
//!
//! ## Recompute Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      VendorBill::recompute()                            │
//! │                                                                         │
//! │  1. keep the booked company currency, refresh enable_discount /         │
//! │     purchase_discount_account_id mirrors                                │
//! │  2. adopt an untagged legacy discount line (draft only)                 │
//! │  3. amount_untaxed / amount_tax from product and tax lines              │
//! │  4. calculator::compute_discount()                                      │
//! │  5. ledger::sync_discount_line()  → SyncOutcome                         │
//! │  6. rebalance the payable line                                          │
//! │  7. amount_total_signed                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edits run on a working copy that replaces the document only when every
//! step succeeded, so a failed edit leaves the bill as it was.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculator::compute_discount;
use crate::company::{Account, CompanyDiscountConfig};
use crate::currency::CurrencyConverter;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ledger::{
    adopt_legacy_discount_line, check_balanced, rebalance_payable, sync_discount_line,
    DiscountContext, JournalLine, LineKind, SyncOutcome,
};
use crate::money::Money;
use crate::purchase::{DiscountDefaults, PurchaseOrder};
use crate::types::{AccountKind, CurrencyCode, DiscountRate, DiscountType, MoveKind, MoveState};
use crate::validation::{validate_discount_rate, validate_name};

/// Accounts used when a bill is generated from a purchase order.
#[derive(Debug, Clone)]
pub struct BillAccounts {
    pub expense: Account,
    pub tax: Account,
    pub payable: Account,
}

/// A vendor bill or credit note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorBill {
    pub id: String,
    pub name: String,
    pub kind: MoveKind,
    pub state: MoveState,
    pub date: NaiveDate,
    pub partner: String,
    pub company_id: String,

    /// Transaction currency.
    pub currency: CurrencyCode,
    pub company_currency: CurrencyCode,

    pub discount_type: Option<DiscountType>,
    pub discount_rate: DiscountRate,
    pub discount_amount: Money,

    pub amount_untaxed: Money,
    pub amount_tax: Money,
    pub amount_total: Money,
    /// `amount_total`, negated for refunds.
    pub amount_total_signed: Money,

    /// The bill this credit note reverses.
    pub reversed_entry_id: Option<String>,
    pub purchase_order_id: Option<String>,

    /// Mirror of the company flag.
    pub enable_discount: bool,
    /// Mirror of the company discount account.
    pub purchase_discount_account_id: Option<String>,

    pub lines: Vec<JournalLine>,
    pub created_at: DateTime<Utc>,
}

impl VendorBill {
    /// Creates an empty draft document with the default `Percent` type.
    pub fn new(
        name: impl Into<String>,
        kind: MoveKind,
        partner: impl Into<String>,
        date: NaiveDate,
        currency: CurrencyCode,
        config: &CompanyDiscountConfig,
    ) -> CoreResult<Self> {
        let name = name.into();
        let partner = partner.into();
        validate_name("name", &name)?;
        validate_name("partner", &partner)?;

        Ok(VendorBill {
            id: Uuid::new_v4().to_string(),
            name,
            kind,
            state: MoveState::Draft,
            date,
            partner,
            company_id: config.company_id.clone(),
            currency,
            company_currency: config.currency.clone(),
            discount_type: Some(DiscountType::default()),
            discount_rate: DiscountRate::zero(),
            discount_amount: Money::zero(),
            amount_untaxed: Money::zero(),
            amount_tax: Money::zero(),
            amount_total: Money::zero(),
            amount_total_signed: Money::zero(),
            reversed_entry_id: None,
            purchase_order_id: None,
            enable_discount: config.enable_discount,
            purchase_discount_account_id: config.discount_account_id().map(str::to_string),
            lines: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Whether the document currency differs from the company currency.
    pub fn is_foreign(&self) -> bool {
        self.currency != self.company_currency
    }

    /// The Discount line, if any.
    pub fn discount_line(&self) -> Option<&JournalLine> {
        self.lines.iter().find(|l| l.kind == LineKind::Discount)
    }

    /// Lines shown on the invoice itself.
    pub fn invoice_lines(&self) -> impl Iterator<Item = &JournalLine> {
        self.lines.iter().filter(|l| l.kind.is_invoice_line())
    }

    fn ensure_editable(&self) -> CoreResult<()> {
        if !self.state.is_editable() {
            return Err(CoreError::DocumentLocked {
                document: self.name.clone(),
                state: self.state,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Lines
    // =========================================================================

    /// Adds a product or tax line for a positive amount in document currency.
    ///
    /// The side (debit/credit) follows the document kind; foreign amounts
    /// are converted at the bill date. Call [`VendorBill::recompute`]
    /// afterwards to refresh totals and the payable line.
    pub fn add_line<C>(
        &mut self,
        name: impl Into<String>,
        account: &Account,
        kind: LineKind,
        amount: Money,
        converter: &C,
    ) -> CoreResult<String>
    where
        C: CurrencyConverter + ?Sized,
    {
        self.ensure_editable()?;
        if !matches!(kind, LineKind::Product | LineKind::Tax) {
            return Err(ValidationError::InvalidFormat {
                field: "line kind".to_string(),
                reason: "only product and tax lines can be added directly".to_string(),
            }
            .into());
        }

        let signed = amount * self.kind.untaxed_sign();
        let line = if self.is_foreign() {
            let company = converter.convert(signed, &self.currency, &self.company_currency, self.date)?;
            JournalLine::new(name, account, kind, company).with_currency(signed, self.currency.clone())
        } else {
            JournalLine::new(name, account, kind, signed)
        };

        let id = line.id.clone();
        self.lines.push(line);
        Ok(id)
    }

    /// Adds an empty payable line unless one exists. Its balance is set by
    /// the next recompute.
    pub fn ensure_payable_line(&mut self, account: &Account) -> CoreResult<()> {
        self.ensure_editable()?;
        if account.kind != AccountKind::Payable {
            return Err(ValidationError::InvalidFormat {
                field: "payable account".to_string(),
                reason: format!("account {} is not a payable account", account.code),
            }
            .into());
        }
        if self.lines.iter().any(JournalLine::is_payable) {
            return Ok(());
        }

        let mut line = JournalLine::new("", account, LineKind::PaymentTerm, Money::zero());
        if self.is_foreign() {
            line = line.with_currency(Money::zero(), self.currency.clone());
        }
        self.lines.push(line);
        Ok(())
    }

    // =========================================================================
    // Recompute
    // =========================================================================

    /// Runs the recompute pipeline and reports what happened to the
    /// Discount line.
    pub fn recompute<C>(&mut self, config: &CompanyDiscountConfig, converter: &C) -> CoreResult<SyncOutcome>
    where
        C: CurrencyConverter + ?Sized,
    {
        let mut next = self.clone();
        let outcome = next.recompute_in_place(config, converter)?;
        *self = next;
        Ok(outcome)
    }

    fn recompute_in_place<C>(&mut self, config: &CompanyDiscountConfig, converter: &C) -> CoreResult<SyncOutcome>
    where
        C: CurrencyConverter + ?Sized,
    {
        self.settle_company_currency(config)?;
        self.refresh_company_settings(config);
        if self.state.is_editable() {
            adopt_legacy_discount_line(&mut self.lines, config);
        }

        self.amount_untaxed = self.lines_total(LineKind::Product);
        self.amount_tax = self.lines_total(LineKind::Tax);

        let totals = compute_discount(
            self.discount_type,
            self.discount_rate,
            self.amount_untaxed,
            self.amount_tax,
        );
        self.discount_rate = totals.discount_rate;
        self.discount_amount = totals.discount_amount;
        self.amount_total = totals.amount_total;
        self.amount_total_signed = totals.amount_total * self.kind.total_sign();

        let ctx = DiscountContext {
            document: &self.name,
            kind: self.kind,
            state: self.state,
            date: self.date,
            currency: &self.currency,
            company_currency: &self.company_currency,
            discount_type: self.discount_type,
            discount_rate: self.discount_rate,
            discount_amount: self.discount_amount,
        };
        let outcome = sync_discount_line(&ctx, &mut self.lines, config, converter)?;

        // plain line edits move the payable line too
        if self.kind.is_purchase() && self.state.is_editable() && self.has_payable_and_counterpart() {
            rebalance_payable(&self.name, &mut self.lines)?;
        }

        Ok(outcome)
    }

    /// Copies the company discount settings into the read-only mirrors.
    ///
    /// The company currency is not a mirror: see
    /// [`VendorBill::check_company_currency`].
    pub fn refresh_company_settings(&mut self, config: &CompanyDiscountConfig) {
        self.enable_discount = config.enable_discount;
        self.purchase_discount_account_id = config.discount_account_id().map(str::to_string);
    }

    /// Fails unless the company still uses the currency this document's
    /// debits and credits are booked in. A document without lines has
    /// booked nothing and always passes.
    pub fn check_company_currency(&self, config: &CompanyDiscountConfig) -> CoreResult<()> {
        if self.lines.is_empty() || self.company_currency == config.currency {
            return Ok(());
        }
        Err(CoreError::CompanyCurrencyChanged {
            document: self.name.clone(),
            booked: self.company_currency.clone(),
            configured: config.currency.clone(),
        })
    }

    /// Takes the configured company currency while nothing is booked.
    fn settle_company_currency(&mut self, config: &CompanyDiscountConfig) -> CoreResult<()> {
        self.check_company_currency(config)?;
        self.company_currency = config.currency.clone();
        Ok(())
    }

    /// Sum of a line kind in document currency, as a positive amount for
    /// the document's direction.
    fn lines_total(&self, kind: LineKind) -> Money {
        let sum: Money = self
            .lines
            .iter()
            .filter(|l| l.kind == kind)
            .map(JournalLine::document_amount)
            .sum();
        sum * self.kind.untaxed_sign()
    }

    fn has_payable_and_counterpart(&self) -> bool {
        self.lines.iter().any(JournalLine::is_payable) && self.lines.iter().any(|l| !l.is_payable())
    }

    // =========================================================================
    // Discount Edits
    // =========================================================================

    /// Changes the discount of a draft document.
    ///
    /// The rate is validated against the untaxed amount of the current
    /// lines. On any error the document is unchanged.
    pub fn set_discount<C>(
        &mut self,
        discount_type: Option<DiscountType>,
        discount_rate: DiscountRate,
        config: &CompanyDiscountConfig,
        converter: &C,
    ) -> CoreResult<SyncOutcome>
    where
        C: CurrencyConverter + ?Sized,
    {
        self.ensure_editable()?;
        validate_discount_rate(discount_type, discount_rate, self.lines_total(LineKind::Product))?;

        let mut next = self.clone();
        next.discount_type = discount_type;
        next.discount_rate = discount_rate;
        let outcome = next.recompute_in_place(config, converter)?;
        *self = next;
        Ok(outcome)
    }

    /// Moves a balanced draft into the ledger.
    pub fn post(&mut self) -> CoreResult<()> {
        self.ensure_editable()?;
        if self.lines.is_empty() {
            return Err(ValidationError::Required {
                field: "lines".to_string(),
            }
            .into());
        }
        check_balanced(&self.name, &self.lines)?;
        self.state = MoveState::Posted;
        Ok(())
    }

    // =========================================================================
    // Refunds
    // =========================================================================

    /// Discount fields a credit note of this bill starts with.
    pub fn refund_defaults(&self) -> DiscountDefaults {
        DiscountDefaults {
            discount_type: self.discount_type,
            discount_rate: self.discount_rate,
            origin_id: self.id.clone(),
        }
    }

    /// Builds the draft credit note reversing this document.
    ///
    /// Every line is mirrored and the discount fields are carried over from
    /// [`VendorBill::refund_defaults`]; the result is recomputed at `date`.
    pub fn reverse<C>(
        &self,
        name: impl Into<String>,
        date: NaiveDate,
        config: &CompanyDiscountConfig,
        converter: &C,
    ) -> CoreResult<VendorBill>
    where
        C: CurrencyConverter + ?Sized,
    {
        self.check_company_currency(config)?;
        let defaults = self.refund_defaults();
        let mut refund = VendorBill::new(
            name,
            self.kind.reversed(),
            self.partner.clone(),
            date,
            self.currency.clone(),
            config,
        )?;
        refund.discount_type = defaults.discount_type;
        refund.discount_rate = defaults.discount_rate;
        refund.reversed_entry_id = Some(defaults.origin_id);
        refund.purchase_order_id = self.purchase_order_id.clone();
        refund.lines = self.lines.iter().map(JournalLine::reversed).collect();

        // line amounts are re-converted at the refund date
        if refund.is_foreign() && date != self.date {
            for line in refund.lines.iter_mut().filter(|l| l.currency.is_some()) {
                let balance =
                    converter.convert(line.amount_currency, &refund.currency, &refund.company_currency, date)?;
                line.set_balance(balance);
            }
        }

        refund.recompute(config, converter)?;
        Ok(refund)
    }

    // =========================================================================
    // From Purchase Order
    // =========================================================================

    /// Creates a draft vendor bill from a purchase order.
    ///
    /// One product line per order line, one tax line for the order's tax, a
    /// payable line, and the order's discount carried over.
    pub fn from_purchase_order<C>(
        order: &PurchaseOrder,
        name: impl Into<String>,
        date: NaiveDate,
        accounts: &BillAccounts,
        config: &CompanyDiscountConfig,
        converter: &C,
    ) -> CoreResult<VendorBill>
    where
        C: CurrencyConverter + ?Sized,
    {
        let mut bill = VendorBill::new(
            name,
            MoveKind::VendorBill,
            order.partner.clone(),
            date,
            order.currency.clone(),
            config,
        )?;
        bill.purchase_order_id = Some(order.id.clone());

        for line in &order.lines {
            bill.add_line(
                line.description.clone(),
                &accounts.expense,
                LineKind::Product,
                line.subtotal(),
                converter,
            )?;
        }
        let tax: Money = order.lines.iter().map(|l| l.tax()).sum();
        if !tax.is_zero() {
            bill.add_line("Taxes", &accounts.tax, LineKind::Tax, tax, converter)?;
        }
        bill.ensure_payable_line(&accounts.payable)?;

        let defaults = order.bill_defaults();
        bill.set_discount(defaults.discount_type, defaults.discount_rate, config, converter)?;
        Ok(bill)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
