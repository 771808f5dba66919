//! # discount-core: Pure Discount Logic for Purchase Documents
//!
//! This crate is the **heart** of the purchase discount ledger. It contains
//! all business logic as pure functions and in-memory documents with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Purchase Discount Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    discount-cli (commands)                      │   │
//! │  │    po create ──► po discount ──► po bill ──► bill refund        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ discount-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌──────────┐ │   │
//! │  │   │ validation │─►│ calculator │─►│   ledger   │  │ currency │ │   │
//! │  │   │   bounds   │  │  amounts   │  │ sync lines │◄─│  rates   │ │   │
//! │  │   └────────────┘  └────────────┘  └────────────┘  └──────────┘ │   │
//! │  │          ▲               ▲               ▲                      │   │
//! │  │   ┌──────┴───────────────┴───────────────┴──────┐               │   │
//! │  │   │   purchase::PurchaseOrder  bill::VendorBill │               │   │
//! │  │   └─────────────────────────────────────────────┘               │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO AMBIENT CONFIG         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 discount-db (Database Layer)                    │   │
//! │  │        SQLite schema, migrations, document repositories         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain enums and small value types
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Discount bounds and field checks
//! - [`calculator`] - Discount amount and total
//! - [`currency`] - Exchange rates and conversion
//! - [`company`] - Company discount settings and accounts
//! - [`ledger`] - Journal lines, sign table, Discount line synchronizer
//! - [`purchase`] - Purchase orders
//! - [`bill`] - Vendor bills and credit notes
//!
//! ## Design Principles
//!
//! 1. **Explicit Configuration**: company settings are passed in, never read from globals
//! 2. **No I/O**: persistence happens in `discount-db`, after recomputation
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Typed Lines**: the Discount line carries a tag, not a magic name
//!
//! ## Example Usage
//!
//! ```rust
//! use discount_core::calculator::compute_discount;
//! use discount_core::money::Money;
//! use discount_core::types::{DiscountRate, DiscountType};
//!
//! // 10% on 100.00 + 10.00 tax
//! let totals = compute_discount(
//!     Some(DiscountType::Percent),
//!     DiscountRate::from_whole(10),
//!     Money::from_cents(10000),
//!     Money::from_cents(1000),
//! );
//!
//! assert_eq!(totals.discount_amount.cents(), 1100);
//! assert_eq!(totals.amount_total.cents(), 9900);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod calculator;
pub mod company;
pub mod currency;
pub mod error;
pub mod ledger;
pub mod money;
pub mod purchase;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use discount_core::Money` instead of
// `use discount_core::money::Money`

pub use bill::{BillAccounts, VendorBill};
pub use calculator::{compute_discount, DiscountTotals};
pub use company::{Account, CompanyDiscountConfig};
pub use currency::{CurrencyConverter, ExchangeRate, RateTable};
pub use error::{CoreError, CoreResult, CurrencyError, ValidationError};
pub use ledger::{JournalLine, LineKind, SkipReason, SyncOutcome};
pub use money::Money;
pub use purchase::{DiscountDefaults, OrderLine, PurchaseOrder};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Company id used when the configuration does not name one.
pub const DEFAULT_COMPANY_ID: &str = "00000000-0000-0000-0000-000000000001";
