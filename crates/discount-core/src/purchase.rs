//! # Purchase Order Adapter
//!
//! Wires the validator and calculator into a purchase order's recompute
//! lifecycle and hands the discount over to the bill created from it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_line() ─────┐                                                      │
//! │                  ├──► recompute()                                       │
//! │  set_discount() ─┘      │                                               │
//! │    (validates first)    ├── refresh company mirrors                     │
//! │                         ├── untaxed / tax from order lines              │
//! │                         └── calculator::compute_discount()              │
//! │                                                                         │
//! │  bill_defaults() ──► discount_type / discount_rate of the new bill      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculator::{compute_discount, DiscountTotals};
use crate::company::CompanyDiscountConfig;
use crate::money::Money;
use crate::types::{CurrencyCode, DiscountRate, DiscountType, TaxRate};
use crate::validation::{
    validate_discount_rate, validate_line_amount, validate_name, validate_quantity, ValidationResult,
};

// =============================================================================
// Order Line
// =============================================================================

/// A product line of a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub description: String,
    pub quantity: i64,
    /// Unit price in document currency.
    pub price_unit: Money,
    pub tax_rate: TaxRate,
}

impl OrderLine {
    pub fn new(
        description: impl Into<String>,
        quantity: i64,
        price_unit: Money,
        tax_rate: TaxRate,
    ) -> ValidationResult<Self> {
        let description = description.into();
        validate_name("description", &description)?;
        validate_quantity(quantity)?;
        validate_line_amount(price_unit, quantity)?;
        Ok(OrderLine {
            id: Uuid::new_v4().to_string(),
            description,
            quantity,
            price_unit,
            tax_rate,
        })
    }

    /// Quantity × unit price.
    pub fn subtotal(&self) -> Money {
        self.price_unit.multiply_quantity(self.quantity)
    }

    pub fn tax(&self) -> Money {
        self.subtotal().calculate_tax(self.tax_rate)
    }

    pub fn total(&self) -> Money {
        self.subtotal() + self.tax()
    }
}

// =============================================================================
// Purchase Order
// =============================================================================

/// Discount fields a bill inherits from its purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountDefaults {
    pub discount_type: Option<DiscountType>,
    pub discount_rate: DiscountRate,
    /// The order or bill the defaults were taken from.
    pub origin_id: String,
}

/// A purchase order with an order-level discount.
///
/// ## Invariant
/// After [`PurchaseOrder::recompute`]:
/// `amount_total = amount_untaxed + amount_tax − discount_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: String,
    pub name: String,
    pub partner: String,
    pub date: NaiveDate,
    pub currency: CurrencyCode,
    pub company_id: String,
    pub lines: Vec<OrderLine>,

    pub discount_type: Option<DiscountType>,
    pub discount_rate: DiscountRate,
    pub discount_amount: Money,

    pub amount_untaxed: Money,
    pub amount_tax: Money,
    pub amount_total: Money,

    /// Mirror of the company flag, refreshed on every recompute.
    pub enable_discount: bool,
    /// Mirror of the company discount account, refreshed on every recompute.
    pub purchase_discount_account_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Creates an empty order with the default `Percent` discount type.
    pub fn new(
        name: impl Into<String>,
        partner: impl Into<String>,
        date: NaiveDate,
        currency: CurrencyCode,
        config: &CompanyDiscountConfig,
    ) -> ValidationResult<Self> {
        let name = name.into();
        let partner = partner.into();
        validate_name("name", &name)?;
        validate_name("partner", &partner)?;

        let mut order = PurchaseOrder {
            id: Uuid::new_v4().to_string(),
            name,
            partner,
            date,
            currency,
            company_id: config.company_id.clone(),
            lines: Vec::new(),
            discount_type: Some(DiscountType::default()),
            discount_rate: DiscountRate::zero(),
            discount_amount: Money::zero(),
            amount_untaxed: Money::zero(),
            amount_tax: Money::zero(),
            amount_total: Money::zero(),
            enable_discount: false,
            purchase_discount_account_id: None,
            created_at: Utc::now(),
        };
        order.recompute(config);
        Ok(order)
    }

    /// Adds a line and recomputes the totals.
    pub fn add_line(&mut self, line: OrderLine, config: &CompanyDiscountConfig) -> DiscountTotals {
        self.lines.push(line);
        self.recompute(config)
    }

    /// Changes the discount. The new rate is validated against the current
    /// untaxed amount before anything is written.
    pub fn set_discount(
        &mut self,
        discount_type: Option<DiscountType>,
        discount_rate: DiscountRate,
        config: &CompanyDiscountConfig,
    ) -> ValidationResult<DiscountTotals> {
        validate_discount_rate(discount_type, discount_rate, self.lines_untaxed())?;
        self.discount_type = discount_type;
        self.discount_rate = discount_rate;
        Ok(self.recompute(config))
    }

    /// Recomputes mirrors, line totals and the discount.
    pub fn recompute(&mut self, config: &CompanyDiscountConfig) -> DiscountTotals {
        self.refresh_company_settings(config);

        self.amount_untaxed = self.lines_untaxed();
        self.amount_tax = self.lines.iter().map(OrderLine::tax).sum();

        let totals = compute_discount(
            self.discount_type,
            self.discount_rate,
            self.amount_untaxed,
            self.amount_tax,
        );
        self.discount_rate = totals.discount_rate;
        self.discount_amount = totals.discount_amount;
        self.amount_total = totals.amount_total;
        totals
    }

    /// Copies the company discount settings into the read-only mirrors.
    pub fn refresh_company_settings(&mut self, config: &CompanyDiscountConfig) {
        self.enable_discount = config.enable_discount;
        self.purchase_discount_account_id = config.discount_account_id().map(str::to_string);
    }

    /// Discount fields for a bill created from this order.
    pub fn bill_defaults(&self) -> DiscountDefaults {
        DiscountDefaults {
            discount_type: self.discount_type,
            discount_rate: self.discount_rate,
            origin_id: self.id.clone(),
        }
    }

    fn lines_untaxed(&self) -> Money {
        self.lines.iter().map(OrderLine::subtotal).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
