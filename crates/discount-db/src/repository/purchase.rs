//! # Purchase Order Repository
//!
//! Stores purchase orders with their lines and computed discount totals.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SINGLE TRANSACTION                                   │
//! │                                                                         │
//! │  1. INSERT purchase_orders ... ON CONFLICT (id) DO UPDATE               │
//! │  2. DELETE FROM purchase_order_lines WHERE order_id = ?                 │
//! │  3. INSERT every line with its sequence                                 │
//! │                                                                         │
//! │  COMMIT ← header and lines change together                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loaded orders carry empty company mirrors; callers refresh them with
//! the current settings before use.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{currency_from_db, next_sequence};
use discount_core::{DiscountType, Money, OrderLine, PurchaseOrder, TaxRate};

/// Prefix of generated purchase order names.
const ORDER_PREFIX: &str = "PO";

/// Repository for purchase orders.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    pool: SqlitePool,
}

impl PurchaseOrderRepository {
    /// Creates a new PurchaseOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseOrderRepository { pool }
    }

    /// Next free order name, e.g. `PO0004`.
    pub async fn next_name(&self, company_id: &str) -> DbResult<String> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM purchase_orders WHERE company_id = ?1")
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(format!("{}{:04}", ORDER_PREFIX, next_sequence(&names, ORDER_PREFIX)))
    }

    /// Inserts or updates an order and replaces its lines.
    pub async fn save(&self, order: &PurchaseOrder) -> DbResult<()> {
        debug!(
            id = %order.id,
            name = %order.name,
            lines = order.lines.len(),
            discount_amount = %order.discount_amount,
            "Saving purchase order"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchase_orders (
                id, company_id, name, partner, date, currency,
                discount_type, discount_rate, discount_amount_cents,
                amount_untaxed_cents, amount_tax_cents, amount_total_cents,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14
            )
            ON CONFLICT (id) DO UPDATE SET
                partner = excluded.partner,
                date = excluded.date,
                currency = excluded.currency,
                discount_type = excluded.discount_type,
                discount_rate = excluded.discount_rate,
                discount_amount_cents = excluded.discount_amount_cents,
                amount_untaxed_cents = excluded.amount_untaxed_cents,
                amount_tax_cents = excluded.amount_tax_cents,
                amount_total_cents = excluded.amount_total_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&order.id)
        .bind(&order.company_id)
        .bind(&order.name)
        .bind(&order.partner)
        .bind(order.date)
        .bind(&order.currency)
        .bind(order.discount_type)
        .bind(order.discount_rate)
        .bind(order.discount_amount.cents())
        .bind(order.amount_untaxed.cents())
        .bind(order.amount_tax.cents())
        .bind(order.amount_total.cents())
        .bind(order.created_at)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM purchase_order_lines WHERE order_id = ?1")
            .bind(&order.id)
            .execute(&mut *tx)
            .await?;

        for (sequence, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO purchase_order_lines (
                    id, order_id, sequence, description, quantity, price_unit_cents, tax_rate_bps
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&line.id)
            .bind(&order.id)
            .bind(sequence as i64)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(line.price_unit.cents())
            .bind(line.tax_rate.bps() as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(name = %order.name, total = %order.amount_total, "Purchase order saved");
        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PurchaseOrder>> {
        let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.load(&row).await?)),
            None => Ok(None),
        }
    }

    /// Gets an order by name or fails with `NotFound`.
    pub async fn get_by_name(&self, company_id: &str, name: &str) -> DbResult<PurchaseOrder> {
        let row = sqlx::query(&format!("{} WHERE company_id = ?1 AND name = ?2", SELECT_ORDER))
            .bind(company_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase order", name))?;

        self.load(&row).await
    }

    /// Lists the orders of a company, newest first.
    pub async fn list(&self, company_id: &str) -> DbResult<Vec<PurchaseOrder>> {
        let rows = sqlx::query(&format!(
            "{} WHERE company_id = ?1 ORDER BY date DESC, name DESC",
            SELECT_ORDER
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(self.load(row).await?);
        }
        Ok(orders)
    }

    async fn load(&self, row: &SqliteRow) -> DbResult<PurchaseOrder> {
        let id: String = row.try_get("id")?;
        let lines = self.get_lines(&id).await?;
        let currency: String = row.try_get("currency")?;
        let date: NaiveDate = row.try_get("date")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let discount_type: Option<DiscountType> = row.try_get("discount_type")?;

        Ok(PurchaseOrder {
            id,
            name: row.try_get("name")?,
            partner: row.try_get("partner")?,
            date,
            currency: currency_from_db(&currency)?,
            company_id: row.try_get("company_id")?,
            lines,
            discount_type,
            discount_rate: row.try_get("discount_rate")?,
            discount_amount: Money::from_cents(row.try_get("discount_amount_cents")?),
            amount_untaxed: Money::from_cents(row.try_get("amount_untaxed_cents")?),
            amount_tax: Money::from_cents(row.try_get("amount_tax_cents")?),
            amount_total: Money::from_cents(row.try_get("amount_total_cents")?),
            enable_discount: false,
            purchase_discount_account_id: None,
            created_at,
        })
    }

    async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, quantity, price_unit_cents, tax_rate_bps
            FROM purchase_order_lines
            WHERE order_id = ?1
            ORDER BY sequence
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> DbResult<OrderLine> {
                let bps: i64 = row.try_get("tax_rate_bps")?;
                Ok(OrderLine {
                    id: row.try_get("id")?,
                    description: row.try_get("description")?,
                    quantity: row.try_get("quantity")?,
                    price_unit: Money::from_cents(row.try_get("price_unit_cents")?),
                    tax_rate: TaxRate::from_bps(
                        u32::try_from(bps).map_err(|e| DbError::invalid("tax rate", e))?,
                    ),
                })
            })
            .collect()
    }
}

const SELECT_ORDER: &str = r#"
    SELECT
        id, company_id, name, partner, date, currency,
        discount_type, discount_rate, discount_amount_cents,
        amount_untaxed_cents, amount_tax_cents, amount_total_cents,
        created_at
    FROM purchase_orders
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{seeded, usd, COMPANY};
    use discount_core::{DiscountRate, PurchaseOrder};

    #[tokio::test]
    async fn test_save_and_reload() {
        let (db, _, config) = seeded().await;
        let repo = db.purchase_orders();

        let name = repo.next_name(COMPANY).await.unwrap();
        assert_eq!(name, "PO0001");

        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut po = PurchaseOrder::new(name, "Acme Supplies", date, usd(), &config).unwrap();
        po.add_line(
            OrderLine::new("Widgets", 4, Money::from_cents(2500), TaxRate::from_bps(1000)).unwrap(),
            &config,
        );
        po.set_discount(Some(DiscountType::Percent), DiscountRate::from_whole(10), &config)
            .unwrap();
        repo.save(&po).await.unwrap();

        let loaded = repo.get_by_name(COMPANY, "PO0001").await.unwrap();
        assert_eq!(loaded.id, po.id);
        assert_eq!(loaded.lines, po.lines);
        assert_eq!(loaded.discount_type, Some(DiscountType::Percent));
        assert_eq!(loaded.discount_rate, DiscountRate::from_whole(10));
        assert_eq!(loaded.discount_amount, Money::from_cents(1100));
        assert_eq!(loaded.amount_total, Money::from_cents(9900));

        assert_eq!(repo.next_name(COMPANY).await.unwrap(), "PO0002");
    }

    #[tokio::test]
    async fn test_save_replaces_lines() {
        let (db, _, config) = seeded().await;
        let repo = db.purchase_orders();
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut po = PurchaseOrder::new("PO0001", "Acme", date, usd(), &config).unwrap();
        po.add_line(OrderLine::new("A", 1, Money::from_cents(100), TaxRate::zero()).unwrap(), &config);
        repo.save(&po).await.unwrap();

        po.lines.clear();
        po.add_line(OrderLine::new("B", 2, Money::from_cents(300), TaxRate::zero()).unwrap(), &config);
        po.set_discount(None, DiscountRate::zero(), &config).unwrap();
        repo.save(&po).await.unwrap();

        let loaded = repo.get_by_id(&po.id).await.unwrap().unwrap();
        assert_eq!(loaded.lines.len(), 1);
        assert_eq!(loaded.lines[0].description, "B");
        assert_eq!(loaded.discount_type, None);
        assert_eq!(loaded.amount_total, Money::from_cents(600));
        assert_eq!(repo.list(COMPANY).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let (db, _, _) = seeded().await;
        assert!(matches!(
            db.purchase_orders().get_by_name(COMPANY, "PO9999").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
