//! # Journal Entry Repository
//!
//! Stores vendor bills, credit notes and customer documents with their
//! journal lines. This is the commit step after an in-memory recompute.
//!
//! ## Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SINGLE TRANSACTION                                   │
//! │                                                                         │
//! │  1. UPSERT account_moves (header, discount fields, totals, state)      │
//! │  2. DELETE FROM account_move_lines WHERE move_id = ?                   │
//! │  3. INSERT the in-memory lines in order                                │
//! │                                                                         │
//! │  COMMIT ← the stored lines are always a balanced set                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{currency_from_db, next_sequence};
use discount_core::{DiscountType, JournalLine, MoveKind, MoveState, Money, VendorBill};

/// Repository for journal entries.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Next free entry name for a kind and year, e.g. `BILL/2026/0003`.
    pub async fn next_name(&self, company_id: &str, kind: MoveKind, date: NaiveDate) -> DbResult<String> {
        let prefix = format!("{}/{}/", kind.prefix(), date.year());
        let names: Vec<String> =
            sqlx::query_scalar("SELECT name FROM account_moves WHERE company_id = ?1 AND kind = ?2")
                .bind(company_id)
                .bind(kind)
                .fetch_all(&self.pool)
                .await?;

        Ok(format!("{}{:04}", prefix, next_sequence(&names, &prefix)))
    }

    /// Inserts or updates an entry and replaces its lines.
    pub async fn save(&self, bill: &VendorBill) -> DbResult<()> {
        debug!(
            id = %bill.id,
            name = %bill.name,
            kind = %bill.kind,
            state = %bill.state,
            lines = bill.lines.len(),
            "Saving journal entry"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO account_moves (
                id, company_id, name, kind, state, date, partner,
                currency, company_currency,
                discount_type, discount_rate, discount_amount_cents,
                amount_untaxed_cents, amount_tax_cents, amount_total_cents, amount_total_signed_cents,
                reversed_entry_id, purchase_order_id,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14, ?15, ?16,
                ?17, ?18,
                ?19, ?20
            )
            ON CONFLICT (id) DO UPDATE SET
                state = excluded.state,
                date = excluded.date,
                partner = excluded.partner,
                currency = excluded.currency,
                company_currency = excluded.company_currency,
                discount_type = excluded.discount_type,
                discount_rate = excluded.discount_rate,
                discount_amount_cents = excluded.discount_amount_cents,
                amount_untaxed_cents = excluded.amount_untaxed_cents,
                amount_tax_cents = excluded.amount_tax_cents,
                amount_total_cents = excluded.amount_total_cents,
                amount_total_signed_cents = excluded.amount_total_signed_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&bill.id)
        .bind(&bill.company_id)
        .bind(&bill.name)
        .bind(bill.kind)
        .bind(bill.state)
        .bind(bill.date)
        .bind(&bill.partner)
        .bind(&bill.currency)
        .bind(&bill.company_currency)
        .bind(bill.discount_type)
        .bind(bill.discount_rate)
        .bind(bill.discount_amount.cents())
        .bind(bill.amount_untaxed.cents())
        .bind(bill.amount_tax.cents())
        .bind(bill.amount_total.cents())
        .bind(bill.amount_total_signed.cents())
        .bind(&bill.reversed_entry_id)
        .bind(&bill.purchase_order_id)
        .bind(bill.created_at)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM account_move_lines WHERE move_id = ?1")
            .bind(&bill.id)
            .execute(&mut *tx)
            .await?;

        for (sequence, line) in bill.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO account_move_lines (
                    id, move_id, sequence, name, account_id, kind,
                    debit_cents, credit_cents, amount_currency_cents, currency
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&line.id)
            .bind(&bill.id)
            .bind(sequence as i64)
            .bind(&line.name)
            .bind(&line.account_id)
            .bind(line.kind)
            .bind(line.debit.cents())
            .bind(line.credit.cents())
            .bind(line.amount_currency.cents())
            .bind(&line.currency)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            name = %bill.name,
            state = %bill.state,
            total = %bill.amount_total,
            discount = %bill.discount_amount,
            "Journal entry saved"
        );
        Ok(())
    }

    /// Gets an entry by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<VendorBill>> {
        let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_MOVE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.load(&row).await?)),
            None => Ok(None),
        }
    }

    /// Gets an entry by name or fails with `NotFound`.
    pub async fn get_by_name(&self, company_id: &str, name: &str) -> DbResult<VendorBill> {
        let row = sqlx::query(&format!("{} WHERE company_id = ?1 AND name = ?2", SELECT_MOVE))
            .bind(company_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Journal entry", name))?;

        self.load(&row).await
    }

    /// Lists the entries of a company, newest first.
    pub async fn list(&self, company_id: &str) -> DbResult<Vec<VendorBill>> {
        let rows = sqlx::query(&format!(
            "{} WHERE company_id = ?1 ORDER BY date DESC, name DESC",
            SELECT_MOVE
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        let mut bills = Vec::with_capacity(rows.len());
        for row in &rows {
            bills.push(self.load(row).await?);
        }
        Ok(bills)
    }

    /// Number of entries of a company, in any state.
    pub async fn count(&self, company_id: &str) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM account_moves WHERE company_id = ?1")
            .bind(company_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Entries generated from a purchase order.
    pub async fn list_for_order(&self, purchase_order_id: &str) -> DbResult<Vec<VendorBill>> {
        let rows = sqlx::query(&format!(
            "{} WHERE purchase_order_id = ?1 ORDER BY date, name",
            SELECT_MOVE
        ))
        .bind(purchase_order_id)
        .fetch_all(&self.pool)
        .await?;

        let mut bills = Vec::with_capacity(rows.len());
        for row in &rows {
            bills.push(self.load(row).await?);
        }
        Ok(bills)
    }

    async fn load(&self, row: &SqliteRow) -> DbResult<VendorBill> {
        let id: String = row.try_get("id")?;
        let lines = self.get_lines(&id).await?;
        let currency: String = row.try_get("currency")?;
        let company_currency: String = row.try_get("company_currency")?;
        let kind: MoveKind = row.try_get("kind")?;
        let state: MoveState = row.try_get("state")?;
        let date: NaiveDate = row.try_get("date")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let discount_type: Option<DiscountType> = row.try_get("discount_type")?;

        Ok(VendorBill {
            id,
            name: row.try_get("name")?,
            kind,
            state,
            date,
            partner: row.try_get("partner")?,
            company_id: row.try_get("company_id")?,
            currency: currency_from_db(&currency)?,
            company_currency: currency_from_db(&company_currency)?,
            discount_type,
            discount_rate: row.try_get("discount_rate")?,
            discount_amount: Money::from_cents(row.try_get("discount_amount_cents")?),
            amount_untaxed: Money::from_cents(row.try_get("amount_untaxed_cents")?),
            amount_tax: Money::from_cents(row.try_get("amount_tax_cents")?),
            amount_total: Money::from_cents(row.try_get("amount_total_cents")?),
            amount_total_signed: Money::from_cents(row.try_get("amount_total_signed_cents")?),
            reversed_entry_id: row.try_get("reversed_entry_id")?,
            purchase_order_id: row.try_get("purchase_order_id")?,
            enable_discount: false,
            purchase_discount_account_id: None,
            lines,
            created_at,
        })
    }

    async fn get_lines(&self, move_id: &str) -> DbResult<Vec<JournalLine>> {
        let rows = sqlx::query(
            r#"
            SELECT
                l.id, l.name, l.account_id, a.kind AS account_kind, l.kind,
                l.debit_cents, l.credit_cents, l.amount_currency_cents, l.currency
            FROM account_move_lines l
            JOIN accounts a ON a.id = l.account_id
            WHERE l.move_id = ?1
            ORDER BY l.sequence
            "#,
        )
        .bind(move_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> DbResult<JournalLine> {
                let currency: Option<String> = row.try_get("currency")?;
                Ok(JournalLine {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    account_id: row.try_get("account_id")?,
                    account_kind: row.try_get("account_kind")?,
                    kind: row.try_get("kind")?,
                    debit: Money::from_cents(row.try_get("debit_cents")?),
                    credit: Money::from_cents(row.try_get("credit_cents")?),
                    amount_currency: Money::from_cents(row.try_get("amount_currency_cents")?),
                    currency: currency.as_deref().map(currency_from_db).transpose()?,
                })
            })
            .collect()
    }
}

const SELECT_MOVE: &str = r#"
    SELECT
        id, company_id, name, kind, state, date, partner,
        currency, company_currency,
        discount_type, discount_rate, discount_amount_cents,
        amount_untaxed_cents, amount_tax_cents, amount_total_cents, amount_total_signed_cents,
        reversed_entry_id, purchase_order_id,
        created_at
    FROM account_moves
"#;
