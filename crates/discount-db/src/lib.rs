//! # discount-db: Database Layer for the Purchase Discount Ledger
//!
//! This crate stores company settings, accounts, exchange rates, purchase
//! orders and journal entries in SQLite, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Discount Data Flow                               │
//! │                                                                         │
//! │  CLI command (bill discount BILL/2026/0001 --percent 10)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load ──► discount-core recompute (in memory) ──► commit                │
//! │       │                                                     │           │
//! │  ┌────▼─────────────────────────────────────────────────────▼───────┐  │
//! │  │                     discount-db (THIS CRATE)                     │  │
//! │  │                                                                  │  │
//! │  │   ┌───────────────┐    ┌──────────────────┐    ┌──────────────┐ │  │
//! │  │   │   Database    │    │   Repositories   │    │  Migrations  │ │  │
//! │  │   │   (pool.rs)   │    │                  │    │  (embedded)  │ │  │
//! │  │   │               │    │ CompanyRepo      │    │              │ │  │
//! │  │   │ SqlitePool    │◄───│ AccountRepo      │    │ 001_init.sql │ │  │
//! │  │   │ Connection    │    │ RateRepo         │    │              │ │  │
//! │  │   │ Management    │    │ PurchaseOrderRepo│    │              │ │  │
//! │  │   │               │    │ BillRepo         │    │              │ │  │
//! │  │   └───────────────┘    └──────────────────┘    └──────────────┘ │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │            <data dir>/purchase-discount/discount.db             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use discount_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/discount.db")).await?;
//!
//! let config = db.company().get("main").await?;
//! let mut bill = db.bills().get_by_name("main", "BILL/2026/0001").await?;
//! bill.set_discount(Some(DiscountType::Percent), rate, &config, &rates)?;
//! db.bills().save(&bill).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::account::AccountRepository;
pub use repository::bill::BillRepository;
pub use repository::company::CompanyRepository;
pub use repository::purchase::PurchaseOrderRepository;
pub use repository::rate::RateRepository;
