//! # Ledger Line Synchronizer
//!
//! Keeps a vendor bill's journal lines consistent with its computed discount
//! while preserving the double-entry invariant (Σdebit = Σcredit).
//!
//! ## Sync Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  discount_amount (document currency)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  convert to company currency at bill date (foreign bills only)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  posting_rule(kind, currency_match)  ← sign table, evaluated once       │
//! │       │                                                                 │
//! │       ├── Discount line exists?  → update it                            │
//! │       ├── none, rate > 0?        → create it on the discount account    │
//! │       └── discount back to zero? → remove it                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rebalance_payable(): payable = −Σ other balances                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The Discount line is recognized by its [`LineKind::Discount`] tag, never by
//! its name.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::company::{Account, CompanyDiscountConfig};
use crate::currency::CurrencyConverter;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{AccountKind, CurrencyCode, DiscountRate, DiscountType, MoveKind, MoveState};

/// Name prefix of discount lines written before lines carried a tag.
const LEGACY_DISCOUNT_PREFIX: &str = "Discount";

// =============================================================================
// Journal Line
// =============================================================================

/// Role of a journal line within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Goods or services; the only kind shown as an invoice line.
    Product,
    Tax,
    /// Vendor/customer balance (payable or receivable).
    PaymentTerm,
    /// The document-level discount.
    Discount,
}

impl LineKind {
    /// Lines listed on the invoice itself, as opposed to journal-only lines.
    pub fn is_invoice_line(&self) -> bool {
        matches!(self, LineKind::Product)
    }
}

/// One line of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    pub id: String,
    pub name: String,
    pub account_id: String,
    pub account_kind: AccountKind,
    pub kind: LineKind,
    /// Company currency.
    pub debit: Money,
    /// Company currency.
    pub credit: Money,
    /// Signed amount in `currency`; zero on company-currency lines.
    pub amount_currency: Money,
    /// Set only when the line is in a foreign currency.
    pub currency: Option<CurrencyCode>,
}

impl JournalLine {
    /// Creates a company-currency line from a signed balance.
    pub fn new(name: impl Into<String>, account: &Account, kind: LineKind, balance: Money) -> Self {
        let (debit, credit) = balance.into_debit_credit();
        JournalLine {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            account_id: account.id.clone(),
            account_kind: account.kind,
            kind,
            debit,
            credit,
            amount_currency: Money::zero(),
            currency: None,
        }
    }

    /// Marks the line as foreign-currency with its signed amount.
    pub fn with_currency(mut self, amount_currency: Money, currency: CurrencyCode) -> Self {
        self.amount_currency = amount_currency;
        self.currency = Some(currency);
        self
    }

    /// `debit − credit`.
    #[inline]
    pub fn balance(&self) -> Money {
        self.debit - self.credit
    }

    pub fn set_balance(&mut self, balance: Money) {
        let (debit, credit) = balance.into_debit_credit();
        self.debit = debit;
        self.credit = credit;
    }

    #[inline]
    pub fn is_payable(&self) -> bool {
        self.account_kind == AccountKind::Payable
    }

    /// Signed amount in the document's currency.
    pub fn document_amount(&self) -> Money {
        if self.currency.is_some() {
            self.amount_currency
        } else {
            self.balance()
        }
    }

    /// The mirrored line used by a reversal: debit and credit swapped,
    /// amount in currency negated, fresh id.
    pub fn reversed(&self) -> JournalLine {
        JournalLine {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            account_id: self.account_id.clone(),
            account_kind: self.account_kind,
            kind: self.kind,
            debit: self.credit,
            credit: self.debit,
            amount_currency: -self.amount_currency,
            currency: self.currency.clone(),
        }
    }
}

/// Sums `(debit, credit)` over lines.
pub fn totals(lines: &[JournalLine]) -> (Money, Money) {
    lines
        .iter()
        .fold((Money::zero(), Money::zero()), |(d, c), line| (d + line.debit, c + line.credit))
}

/// Fails with [`CoreError::Unbalanced`] unless Σdebit = Σcredit.
pub fn check_balanced(document: &str, lines: &[JournalLine]) -> CoreResult<()> {
    let (debit, credit) = totals(lines);
    if debit != credit {
        return Err(CoreError::Unbalanced {
            document: document.to_string(),
            debit,
            credit,
        });
    }
    Ok(())
}

// =============================================================================
// Sign Table
// =============================================================================

/// How a discount is booked for one `{kind × currency_match}` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingRule {
    /// Sign of the line balance: −1 books a credit, +1 a debit.
    pub balance_sign: i64,
    /// Whether the line carries amount_currency / currency.
    pub carries_currency: bool,
}

/// The sign table. Customer documents have no discount line.
///
/// | kind          | same currency   | foreign currency                         |
/// |---------------|-----------------|------------------------------------------|
/// | vendor bill   | credit amount   | credit converted, amount_currency −amount |
/// | vendor refund | debit amount    | debit converted, amount_currency +amount  |
pub const fn posting_rule(kind: MoveKind, currency_match: bool) -> Option<PostingRule> {
    let balance_sign = match kind {
        MoveKind::VendorBill => -1,
        MoveKind::VendorRefund => 1,
        MoveKind::CustomerInvoice | MoveKind::CustomerRefund => return None,
    };
    Some(PostingRule {
        balance_sign,
        carries_currency: !currency_match,
    })
}

/// Debit/credit/currency values of a discount line, evaluated once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountPosting {
    pub debit: Money,
    pub credit: Money,
    pub amount_currency: Money,
    pub currency: Option<CurrencyCode>,
}

impl DiscountPosting {
    /// Evaluates the sign table for a discount.
    ///
    /// `amount` is in document currency, `amount_company` the same value in
    /// company currency (equal to `amount` when the currencies match).
    pub fn evaluate(
        kind: MoveKind,
        amount: Money,
        amount_company: Money,
        document_currency: &CurrencyCode,
        currency_match: bool,
    ) -> Option<Self> {
        let rule = posting_rule(kind, currency_match)?;
        let (debit, credit) = (amount_company * rule.balance_sign).into_debit_credit();
        let (amount_currency, currency) = if rule.carries_currency {
            (amount * rule.balance_sign, Some(document_currency.clone()))
        } else {
            (Money::zero(), None)
        };
        Some(DiscountPosting {
            debit,
            credit,
            amount_currency,
            currency,
        })
    }

    fn apply_to(&self, line: &mut JournalLine) {
        line.debit = self.debit;
        line.credit = self.credit;
        line.amount_currency = self.amount_currency;
        line.currency = self.currency.clone();
    }
}

/// Descriptive name of the discount line, e.g. `Discount @10%` or
/// `Discount of amount #20`.
pub fn discount_line_name(discount_type: Option<DiscountType>, rate: DiscountRate) -> String {
    match discount_type {
        Some(DiscountType::Percent) => format!("Discount @{}%", rate),
        Some(DiscountType::Amount) => format!("Discount of amount #{}", rate),
        None => "Discount".to_string(),
    }
}

// =============================================================================
// Rebalancing
// =============================================================================

/// Restores Σdebit = Σcredit by rewriting the payable line.
///
/// The payable line takes `−Σ others.balance` and
/// `−Σ others.amount_currency`. With several payable lines the earlier ones
/// keep their values and the last one absorbs the difference.
pub fn rebalance_payable(document: &str, lines: &mut [JournalLine]) -> CoreResult<()> {
    let payable: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.is_payable())
        .map(|(i, _)| i)
        .collect();

    let Some(&target) = payable.last() else {
        return Err(CoreError::MissingPayableLine {
            document: document.to_string(),
        });
    };
    if payable.len() == lines.len() {
        return Err(CoreError::MissingCounterpartLines {
            document: document.to_string(),
        });
    }

    let (mut balance, mut amount_currency) = (Money::zero(), Money::zero());
    for (_, line) in lines.iter().enumerate().filter(|(i, _)| *i != target) {
        balance += line.balance();
        amount_currency += line.amount_currency;
    }

    let line = &mut lines[target];
    line.set_balance(-balance);
    line.amount_currency = -amount_currency;
    Ok(())
}

// =============================================================================
// Synchronizer
// =============================================================================

/// Document fields the synchronizer reads.
#[derive(Debug, Clone)]
pub struct DiscountContext<'a> {
    pub document: &'a str,
    pub kind: MoveKind,
    pub state: MoveState,
    pub date: NaiveDate,
    pub currency: &'a CurrencyCode,
    pub company_currency: &'a CurrencyCode,
    pub discount_type: Option<DiscountType>,
    pub discount_rate: DiscountRate,
    pub discount_amount: Money,
}

/// Why the synchronizer left the lines alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Customer documents carry no discount line.
    NotPurchase,
    /// Posted or cancelled documents are frozen.
    NotDraft,
    /// A new line is needed but the company has no discount account.
    NoDiscountAccount,
    /// No discount and no discount line.
    NoDiscount,
}

/// What the synchronizer did to the discount line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum SyncOutcome {
    Created { line_id: String },
    Updated { line_id: String },
    Removed { line_id: String },
    Skipped { reason: SkipReason },
}

/// Creates, updates or removes the Discount line and rebalances the payable
/// line.
///
/// The document is validated before anything is written: on error the
/// lines are unchanged.
pub fn sync_discount_line<C>(
    ctx: &DiscountContext<'_>,
    lines: &mut Vec<JournalLine>,
    config: &CompanyDiscountConfig,
    converter: &C,
) -> CoreResult<SyncOutcome>
where
    C: CurrencyConverter + ?Sized,
{
    let skipped = |reason| Ok(SyncOutcome::Skipped { reason });

    if !ctx.kind.is_purchase() {
        return skipped(SkipReason::NotPurchase);
    }
    if !ctx.state.is_editable() {
        return skipped(SkipReason::NotDraft);
    }

    let existing = lines.iter().position(|l| l.kind == LineKind::Discount);
    let amount = ctx.discount_amount;

    if amount.is_zero() {
        let Some(index) = existing else {
            return skipped(SkipReason::NoDiscount);
        };
        ensure_shape(ctx.document, lines, Some(index))?;
        let removed = lines.remove(index);
        lines.retain(|l| l.kind != LineKind::Discount);
        rebalance_payable(ctx.document, lines)?;
        return Ok(SyncOutcome::Removed { line_id: removed.id });
    }

    if existing.is_none() && !ctx.discount_rate.is_positive() {
        return skipped(SkipReason::NoDiscount);
    }
    // an existing line follows the discount even once the account is gone;
    // only a new line needs it
    let new_line_account = match existing {
        Some(_) => None,
        None => match config.purchase_discount_account.as_ref() {
            Some(account) => Some(account),
            None => return skipped(SkipReason::NoDiscountAccount),
        },
    };
    ensure_shape(ctx.document, lines, existing)?;

    let currency_match = ctx.currency == ctx.company_currency;
    let amount_company = if currency_match {
        amount
    } else {
        converter.convert(amount, ctx.currency, ctx.company_currency, ctx.date)?
    };

    let Some(posting) =
        DiscountPosting::evaluate(ctx.kind, amount, amount_company, ctx.currency, currency_match)
    else {
        return skipped(SkipReason::NotPurchase);
    };
    let name = discount_line_name(ctx.discount_type, ctx.discount_rate);

    let outcome = match (existing, new_line_account) {
        (Some(index), _) => {
            let line = &mut lines[index];
            line.name = name;
            posting.apply_to(line);
            let line_id = line.id.clone();
            // at most one discount line per document
            lines.retain(|l| l.kind != LineKind::Discount || l.id == line_id);
            SyncOutcome::Updated { line_id }
        }
        (None, Some(account)) => {
            let mut line = JournalLine::new(name, account, LineKind::Discount, Money::zero());
            posting.apply_to(&mut line);
            let line_id = line.id.clone();
            lines.push(line);
            SyncOutcome::Created { line_id }
        }
        (None, None) => return skipped(SkipReason::NoDiscountAccount),
    };

    rebalance_payable(ctx.document, lines)?;
    Ok(outcome)
}

/// A payable line and at least one line other than the payable and the
/// discount line must exist.
fn ensure_shape(document: &str, lines: &[JournalLine], discount: Option<usize>) -> CoreResult<()> {
    if !lines.iter().any(JournalLine::is_payable) {
        return Err(CoreError::MissingPayableLine {
            document: document.to_string(),
        });
    }
    let counterparts = lines
        .iter()
        .enumerate()
        .filter(|(i, l)| !l.is_payable() && Some(*i) != discount && l.kind != LineKind::Discount)
        .count();
    if counterparts == 0 {
        return Err(CoreError::MissingCounterpartLines {
            document: document.to_string(),
        });
    }
    Ok(())
}

/// Tags an untagged line as the Discount line when it was written by name
/// convention: its name starts with "Discount" AND it sits on the configured
/// discount account. Returns the adopted line id.
pub fn adopt_legacy_discount_line(
    lines: &mut [JournalLine],
    config: &CompanyDiscountConfig,
) -> Option<String> {
    if lines.iter().any(|l| l.kind == LineKind::Discount) {
        return None;
    }
    let account_id = config.discount_account_id()?;
    let line = lines.iter_mut().find(|l| {
        l.kind != LineKind::PaymentTerm
            && l.account_id == account_id
            && l.name.starts_with(LEGACY_DISCOUNT_PREFIX)
    })?;
    line.kind = LineKind::Discount;
    Some(line.id.clone())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{ExchangeRate, RateTable};
    use rust_decimal::Decimal;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    fn eur() -> CurrencyCode {
        CurrencyCode::new("EUR").unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()
    }

    fn expense() -> Account {
        Account::new("exp", "6000", "Purchases", AccountKind::Expense).unwrap()
    }

    fn tax() -> Account {
        Account::new("tax", "4456", "Input VAT", AccountKind::Tax).unwrap()
    }

    fn payable() -> Account {
        Account::new("pay", "4010", "Vendors", AccountKind::Payable).unwrap()
    }

    fn discount_account() -> Account {
        Account::new("disc", "7090", "Purchase Discounts", AccountKind::Income).unwrap()
    }

    fn config() -> CompanyDiscountConfig {
        CompanyDiscountConfig::new("main", usd())
            .with_discount_account(discount_account())
            .unwrap()
    }

    fn rates() -> RateTable {
        // 0.5 EUR per USD: 1 EUR = 2 USD
        RateTable::from_rates(
            usd(),
            [ExchangeRate {
                currency: eur(),
                date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                rate: Decimal::new(5, 1),
            }],
        )
        .unwrap()
    }

    /// Bill of 100 + 10 tax, payable 110.
    fn bill_lines() -> Vec<JournalLine> {
        vec![
            JournalLine::new("Widgets", &expense(), LineKind::Product, Money::from_cents(10000)),
            JournalLine::new("VAT 10%", &tax(), LineKind::Tax, Money::from_cents(1000)),
            JournalLine::new("", &payable(), LineKind::PaymentTerm, Money::from_cents(-11000)),
        ]
    }

    fn ctx<'a>(
        kind: MoveKind,
        currency: &'a CurrencyCode,
        company: &'a CurrencyCode,
        amount: Money,
    ) -> DiscountContext<'a> {
        DiscountContext {
            document: "BILL/0001",
            kind,
            state: MoveState::Draft,
            date: today(),
            currency,
            company_currency: company,
            discount_type: Some(DiscountType::Percent),
            discount_rate: DiscountRate::from_whole(10),
            discount_amount: amount,
        }
    }

    fn discount_line(lines: &[JournalLine]) -> &JournalLine {
        lines.iter().find(|l| l.kind == LineKind::Discount).unwrap()
    }

    fn payable_line(lines: &[JournalLine]) -> &JournalLine {
        lines.iter().find(|l| l.is_payable()).unwrap()
    }

    #[test]
    fn test_sign_table() {
        assert_eq!(
            posting_rule(MoveKind::VendorBill, true),
            Some(PostingRule { balance_sign: -1, carries_currency: false })
        );
        assert_eq!(
            posting_rule(MoveKind::VendorRefund, false),
            Some(PostingRule { balance_sign: 1, carries_currency: true })
        );
        assert_eq!(posting_rule(MoveKind::CustomerInvoice, true), None);
    }

    #[test]
    fn test_creates_discount_line_and_stays_balanced() {
        let (usd, company) = (usd(), usd());
        let mut lines = bill_lines();
        check_balanced("BILL/0001", &lines).unwrap();

        let outcome = sync_discount_line(
            &ctx(MoveKind::VendorBill, &usd, &company, Money::from_cents(1000)),
            &mut lines,
            &config(),
            &rates(),
        )
        .unwrap();

        assert!(matches!(outcome, SyncOutcome::Created { .. }));
        let discount = discount_line(&lines);
        assert_eq!(discount.credit, Money::from_cents(1000));
        assert_eq!(discount.debit, Money::zero());
        assert_eq!(discount.account_id, "disc");
        assert_eq!(discount.name, "Discount @10%");
        assert_eq!(payable_line(&lines).credit, Money::from_cents(10000));
        check_balanced("BILL/0001", &lines).unwrap();
    }

    #[test]
    fn test_updates_existing_line_in_place() {
        let (usd, company) = (usd(), usd());
        let mut lines = bill_lines();
        let c = config();
        let first = sync_discount_line(
            &ctx(MoveKind::VendorBill, &usd, &company, Money::from_cents(1100)),
            &mut lines,
            &c,
            &rates(),
        )
        .unwrap();

        let mut changed = ctx(MoveKind::VendorBill, &usd, &company, Money::from_cents(2000));
        changed.discount_type = Some(DiscountType::Amount);
        changed.discount_rate = DiscountRate::from_whole(20);
        let second = sync_discount_line(&changed, &mut lines, &c, &rates()).unwrap();

        let (SyncOutcome::Created { line_id: a }, SyncOutcome::Updated { line_id: b }) = (first, second)
        else {
            panic!("unexpected outcomes");
        };
        assert_eq!(a, b);
        assert_eq!(lines.iter().filter(|l| l.kind == LineKind::Discount).count(), 1);
        assert_eq!(discount_line(&lines).credit, Money::from_cents(2000));
        assert_eq!(discount_line(&lines).name, "Discount of amount #20");
        assert_eq!(payable_line(&lines).credit, Money::from_cents(9000));
        check_balanced("BILL/0001", &lines).unwrap();
    }

    #[test]
    fn test_refund_books_discount_as_debit() {
        let (usd, company) = (usd(), usd());
        let mut lines: Vec<JournalLine> = bill_lines().iter().map(JournalLine::reversed).collect();

        sync_discount_line(
            &ctx(MoveKind::VendorRefund, &usd, &company, Money::from_cents(1100)),
            &mut lines,
            &config(),
            &rates(),
        )
        .unwrap();

        assert_eq!(discount_line(&lines).debit, Money::from_cents(1100));
        assert_eq!(payable_line(&lines).debit, Money::from_cents(9900));
        check_balanced("RBILL/0001", &lines).unwrap();
    }

    #[test]
    fn test_foreign_currency_discount_line() {
        let (eur, company) = (eur(), usd());
        // 100 EUR + 10 EUR tax at 2 USD per EUR
        let mut lines = vec![
            JournalLine::new("Widgets", &expense(), LineKind::Product, Money::from_cents(20000))
                .with_currency(Money::from_cents(10000), eur.clone()),
            JournalLine::new("VAT", &tax(), LineKind::Tax, Money::from_cents(2000))
                .with_currency(Money::from_cents(1000), eur.clone()),
            JournalLine::new("", &payable(), LineKind::PaymentTerm, Money::from_cents(-22000))
                .with_currency(Money::from_cents(-11000), eur.clone()),
        ];

        sync_discount_line(
            &ctx(MoveKind::VendorBill, &eur, &company, Money::from_cents(1100)),
            &mut lines,
            &config(),
            &rates(),
        )
        .unwrap();

        let discount = discount_line(&lines);
        assert_eq!(discount.amount_currency, Money::from_cents(-1100));
        assert_eq!(discount.currency, Some(eur.clone()));
        assert_eq!(discount.credit, Money::from_cents(2200));

        let payable = payable_line(&lines);
        assert_eq!(payable.credit, Money::from_cents(19800));
        assert_eq!(payable.amount_currency, Money::from_cents(-9900));
        check_balanced("BILL/0001", &lines).unwrap();
    }

    #[test]
    fn test_missing_rate_leaves_lines_untouched() {
        let (gbp, company) = (CurrencyCode::new("GBP").unwrap(), usd());
        let mut lines = bill_lines();
        let before = lines.clone();

        let err = sync_discount_line(
            &ctx(MoveKind::VendorBill, &gbp, &company, Money::from_cents(1100)),
            &mut lines,
            &config(),
            &rates(),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::Currency(_)));
        assert_eq!(lines, before);
    }

    #[test]
    fn test_removes_line_when_discount_drops_to_zero() {
        let (usd, company) = (usd(), usd());
        let mut lines = bill_lines();
        let c = config();
        sync_discount_line(
            &ctx(MoveKind::VendorBill, &usd, &company, Money::from_cents(1100)),
            &mut lines,
            &c,
            &rates(),
        )
        .unwrap();

        let mut cleared = ctx(MoveKind::VendorBill, &usd, &company, Money::zero());
        cleared.discount_type = None;
        cleared.discount_rate = DiscountRate::zero();
        let outcome = sync_discount_line(&cleared, &mut lines, &c, &rates()).unwrap();

        assert!(matches!(outcome, SyncOutcome::Removed { .. }));
        assert!(lines.iter().all(|l| l.kind != LineKind::Discount));
        assert_eq!(payable_line(&lines).credit, Money::from_cents(11000));
    }

    #[test]
    fn test_skips() {
        let (usd, company) = (usd(), usd());
        let mut lines = bill_lines();
        let before = lines.clone();

        let customer = ctx(MoveKind::CustomerInvoice, &usd, &company, Money::from_cents(1100));
        assert_eq!(
            sync_discount_line(&customer, &mut lines, &config(), &rates()).unwrap(),
            SyncOutcome::Skipped { reason: SkipReason::NotPurchase }
        );

        let mut posted = ctx(MoveKind::VendorBill, &usd, &company, Money::from_cents(1100));
        posted.state = MoveState::Posted;
        assert_eq!(
            sync_discount_line(&posted, &mut lines, &config(), &rates()).unwrap(),
            SyncOutcome::Skipped { reason: SkipReason::NotDraft }
        );

        let no_account = CompanyDiscountConfig::new("main", usd.clone());
        let bill = ctx(MoveKind::VendorBill, &usd, &company, Money::from_cents(1100));
        assert_eq!(
            sync_discount_line(&bill, &mut lines, &no_account, &rates()).unwrap(),
            SyncOutcome::Skipped { reason: SkipReason::NoDiscountAccount }
        );
        assert_eq!(lines, before);
    }

    #[test]
    fn test_existing_line_follows_discount_without_account() {
        let (usd, company) = (usd(), usd());
        let mut lines = bill_lines();
        let created = sync_discount_line(
            &ctx(MoveKind::VendorBill, &usd, &company, Money::from_cents(1100)),
            &mut lines,
            &config(),
            &rates(),
        )
        .unwrap();
        let SyncOutcome::Created { line_id } = created else {
            panic!("expected a new discount line, got {:?}", created);
        };

        // account cleared, rate raised to 50%
        let no_account = CompanyDiscountConfig::new("main", usd.clone());
        let mut raised = ctx(MoveKind::VendorBill, &usd, &company, Money::from_cents(5500));
        raised.discount_rate = DiscountRate::from_whole(50);
        let outcome = sync_discount_line(&raised, &mut lines, &no_account, &rates()).unwrap();

        assert_eq!(outcome, SyncOutcome::Updated { line_id: line_id.clone() });
        let discount = discount_line(&lines);
        assert_eq!(discount.credit, Money::from_cents(5500));
        assert_eq!(discount.account_id, "disc");
        assert_eq!(payable_line(&lines).credit, Money::from_cents(5500));
        check_balanced("BILL/0001", &lines).unwrap();

        let cleared = ctx(MoveKind::VendorBill, &usd, &company, Money::zero());
        let outcome = sync_discount_line(&cleared, &mut lines, &no_account, &rates()).unwrap();
        assert_eq!(outcome, SyncOutcome::Removed { line_id });
        assert_eq!(payable_line(&lines).credit, Money::from_cents(11000));
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        let (usd, company) = (usd(), usd());
        let c = ctx(MoveKind::VendorBill, &usd, &company, Money::from_cents(1100));

        let mut no_payable = vec![JournalLine::new(
            "Widgets",
            &expense(),
            LineKind::Product,
            Money::from_cents(10000),
        )];
        assert!(matches!(
            sync_discount_line(&c, &mut no_payable, &config(), &rates()),
            Err(CoreError::MissingPayableLine { .. })
        ));
        assert_eq!(no_payable.len(), 1);

        let mut only_payable = vec![JournalLine::new("", &payable(), LineKind::PaymentTerm, Money::zero())];
        assert!(matches!(
            sync_discount_line(&c, &mut only_payable, &config(), &rates()),
            Err(CoreError::MissingCounterpartLines { .. })
        ));
        assert_eq!(only_payable.len(), 1);
    }

    #[test]
    fn test_rebalance_with_split_payment_terms() {
        let mut lines = bill_lines();
        lines[2].set_balance(Money::from_cents(-5000));
        lines.push(JournalLine::new("", &payable(), LineKind::PaymentTerm, Money::from_cents(-1)));

        rebalance_payable("BILL/0001", &mut lines).unwrap();

        assert_eq!(lines[2].credit, Money::from_cents(5000));
        assert_eq!(lines[3].credit, Money::from_cents(6000));
        check_balanced("BILL/0001", &lines).unwrap();
    }

    #[test]
    fn test_adopts_legacy_line_only_on_discount_account() {
        let c = config();
        let mut lines = bill_lines();
        // user-entered product line that merely starts with "Discount"
        lines.push(JournalLine::new(
            "Discount shelf brackets",
            &expense(),
            LineKind::Product,
            Money::from_cents(500),
        ));
        assert_eq!(adopt_legacy_discount_line(&mut lines, &c), None);

        lines.push(JournalLine::new(
            "Discount  @10.0%",
            &discount_account(),
            LineKind::Product,
            Money::from_cents(-1100),
        ));
        let adopted = adopt_legacy_discount_line(&mut lines, &c).unwrap();
        assert_eq!(discount_line(&lines).id, adopted);
        assert_eq!(lines.iter().filter(|l| l.kind == LineKind::Discount).count(), 1);
    }
}
