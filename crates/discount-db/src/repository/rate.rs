//! # Exchange Rate Repository
//!
//! Dated currency rates against the company currency. Rates are kept as
//! decimal text so no precision is lost between runs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::currency_from_db;
use discount_core::{CurrencyCode, ExchangeRate, RateTable};

/// Repository for exchange rates.
#[derive(Debug, Clone)]
pub struct RateRepository {
    pool: SqlitePool,
}

impl RateRepository {
    /// Creates a new RateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RateRepository { pool }
    }

    /// Inserts a rate, replacing any rate of the same currency and date.
    pub async fn upsert(&self, company_id: &str, rate: &ExchangeRate) -> DbResult<()> {
        if rate.rate <= Decimal::ZERO {
            return Err(DbError::invalid("exchange rate", format!("{} must be positive", rate.rate)));
        }
        debug!(currency = %rate.currency, date = %rate.date, rate = %rate.rate, "Saving exchange rate");

        sqlx::query(
            r#"
            INSERT INTO currency_rates (company_id, currency, date, rate)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (company_id, currency, date) DO UPDATE SET rate = excluded.rate
            "#,
        )
        .bind(company_id)
        .bind(&rate.currency)
        .bind(rate.date)
        .bind(rate.rate.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists all rates of a company, oldest first.
    pub async fn list(&self, company_id: &str) -> DbResult<Vec<ExchangeRate>> {
        let rows = sqlx::query(
            "SELECT currency, date, rate FROM currency_rates WHERE company_id = ?1 ORDER BY currency, date",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> DbResult<ExchangeRate> {
                let currency: String = row.try_get("currency")?;
                let date: NaiveDate = row.try_get("date")?;
                let rate: String = row.try_get("rate")?;
                Ok(ExchangeRate {
                    currency: currency_from_db(&currency)?,
                    date,
                    rate: Decimal::from_str(&rate).map_err(|e| DbError::invalid("exchange rate", e))?,
                })
            })
            .collect()
    }

    /// Loads every rate of a company into a [`RateTable`].
    pub async fn load_table(&self, company_id: &str, company_currency: &CurrencyCode) -> DbResult<RateTable> {
        let rates = self.list(company_id).await?;
        debug!(company_id = %company_id, count = rates.len(), "Loaded exchange rates");

        RateTable::from_rates(company_currency.clone(), rates).map_err(|e| DbError::invalid("exchange rate", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{database, eur, usd, COMPANY};
    use discount_core::{CurrencyConverter, Money};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_rates_feed_conversion() {
        let db = database().await;
        let repo = db.rates();
        repo.upsert(COMPANY, &ExchangeRate { currency: eur(), date: date(1, 1), rate: Decimal::new(5, 1) })
            .await
            .unwrap();
        repo.upsert(COMPANY, &ExchangeRate { currency: eur(), date: date(6, 1), rate: Decimal::new(8, 1) })
            .await
            .unwrap();

        let table = repo.load_table(COMPANY, &usd()).await.unwrap();
        let early = table.convert(Money::from_cents(1100), &eur(), &usd(), date(3, 1)).unwrap();
        let late = table.convert(Money::from_cents(1100), &eur(), &usd(), date(7, 1)).unwrap();
        assert_eq!(early, Money::from_cents(2200));
        assert_eq!(late, Money::from_cents(1375));
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_day() {
        let db = database().await;
        let repo = db.rates();
        let mut rate = ExchangeRate { currency: eur(), date: date(1, 1), rate: Decimal::new(9, 1) };
        repo.upsert(COMPANY, &rate).await.unwrap();
        rate.rate = Decimal::new(91234, 5);
        repo.upsert(COMPANY, &rate).await.unwrap();

        let rates = repo.list(COMPANY).await.unwrap();
        assert_eq!(rates, vec![rate]);
    }

    #[tokio::test]
    async fn test_rejects_zero_rate() {
        let db = database().await;
        let err = db
            .rates()
            .upsert(COMPANY, &ExchangeRate { currency: eur(), date: date(1, 1), rate: Decimal::ZERO })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidData { .. }));
    }
}
