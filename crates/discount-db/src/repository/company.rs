//! # Company Settings Repository
//!
//! Stores the company discount settings: currency, the enable flag and the
//! purchase discount account.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::account::account_from_row;
use crate::repository::currency_from_db;
use discount_core::CompanyDiscountConfig;

/// Repository for company discount settings.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    /// Creates a new CompanyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    /// Gets the settings of a company, with the discount account resolved.
    pub async fn get(&self, company_id: &str) -> DbResult<Option<CompanyDiscountConfig>> {
        let row = sqlx::query(
            r#"
            SELECT
                s.company_id,
                s.currency,
                s.enable_discount,
                a.id   AS account_id,
                a.code AS account_code,
                a.name AS account_name,
                a.kind AS account_kind
            FROM company_settings s
            LEFT JOIN accounts a ON a.id = s.purchase_discount_account_id
            WHERE s.company_id = ?1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let currency: String = row.try_get("currency")?;
        let account_id: Option<String> = row.try_get("account_id")?;
        let purchase_discount_account = match account_id {
            Some(id) => Some(discount_core::Account {
                id,
                code: row.try_get("account_code")?,
                name: row.try_get("account_name")?,
                kind: row.try_get("account_kind")?,
            }),
            None => None,
        };

        let config = CompanyDiscountConfig {
            company_id: row.try_get("company_id")?,
            currency: currency_from_db(&currency)?,
            enable_discount: row.try_get("enable_discount")?,
            purchase_discount_account,
        };
        config
            .validate()
            .map_err(|e| DbError::invalid("company settings", e))?;
        Ok(Some(config))
    }

    /// Gets the settings or fails with `NotFound`.
    pub async fn require(&self, company_id: &str) -> DbResult<CompanyDiscountConfig> {
        self.get(company_id)
            .await?
            .ok_or_else(|| DbError::not_found("Company settings", company_id))
    }

    /// Inserts or replaces the settings of a company.
    pub async fn save(&self, config: &CompanyDiscountConfig) -> DbResult<()> {
        debug!(
            company_id = %config.company_id,
            enable_discount = config.enable_discount,
            discount_account = ?config.discount_account_id(),
            "Saving company settings"
        );

        sqlx::query(
            r#"
            INSERT INTO company_settings (
                company_id, currency, enable_discount, purchase_discount_account_id, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (company_id) DO UPDATE SET
                currency = excluded.currency,
                enable_discount = excluded.enable_discount,
                purchase_discount_account_id = excluded.purchase_discount_account_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&config.company_id)
        .bind(&config.currency)
        .bind(config.enable_discount)
        .bind(config.discount_account_id())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(company_id = %config.company_id, "Company settings saved");
        Ok(())
    }

    /// Loads the discount account of a company, if configured.
    pub async fn discount_account(&self, company_id: &str) -> DbResult<Option<discount_core::Account>> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.code, a.name, a.kind
            FROM company_settings s
            JOIN accounts a ON a.id = s.purchase_discount_account_id
            WHERE s.company_id = ?1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(account_from_row).transpose()
    }
}
