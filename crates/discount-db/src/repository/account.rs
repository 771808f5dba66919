//! # Account Repository
//!
//! The chart of accounts journal lines post to.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use discount_core::{Account, AccountKind};

/// Repository for ledger accounts.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Inserts an account. Codes are unique per company.
    pub async fn insert(&self, company_id: &str, account: &Account) -> DbResult<()> {
        debug!(id = %account.id, code = %account.code, kind = %account.kind, "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (id, company_id, code, name, kind, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&account.id)
        .bind(company_id)
        .bind(&account.code)
        .bind(&account.name)
        .bind(account.kind)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, account.code.clone()),
            other => other,
        })?;

        Ok(())
    }

    /// Gets an account by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let row = sqlx::query("SELECT id, code, name, kind FROM accounts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    /// Gets an account by its code.
    pub async fn get_by_code(&self, company_id: &str, code: &str) -> DbResult<Account> {
        let row = sqlx::query(
            "SELECT id, code, name, kind FROM accounts WHERE company_id = ?1 AND code = ?2",
        )
        .bind(company_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Account", code))?;

        account_from_row(&row)
    }

    /// Lists all accounts of a company ordered by code.
    pub async fn list(&self, company_id: &str) -> DbResult<Vec<Account>> {
        let rows = sqlx::query(
            "SELECT id, code, name, kind FROM accounts WHERE company_id = ?1 ORDER BY code",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(account_from_row).collect()
    }

    /// First account of a kind by code, used as a default when generating bills.
    pub async fn first_of_kind(&self, company_id: &str, kind: AccountKind) -> DbResult<Account> {
        let row = sqlx::query(
            r#"
            SELECT id, code, name, kind FROM accounts
            WHERE company_id = ?1 AND kind = ?2
            ORDER BY code
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Account", format!("kind {}", kind)))?;

        account_from_row(&row)
    }
}

pub(crate) fn account_from_row(row: &SqliteRow) -> DbResult<Account> {
    Ok(Account {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        kind: row.try_get("kind")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{database, COMPANY};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = database().await;
        let repo = db.accounts();
        let account = Account::new("a1", "4010", "Vendors", AccountKind::Payable).unwrap();
        repo.insert(COMPANY, &account).await.unwrap();

        assert_eq!(repo.get_by_id("a1").await.unwrap(), Some(account.clone()));
        assert_eq!(repo.get_by_code(COMPANY, "4010").await.unwrap(), account);
        assert_eq!(repo.first_of_kind(COMPANY, AccountKind::Payable).await.unwrap(), account);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = database().await;
        let repo = db.accounts();
        let a = Account::new("a1", "6000", "Purchases", AccountKind::Expense).unwrap();
        let b = Account::new("a2", "6000", "Other", AccountKind::Expense).unwrap();
        repo.insert(COMPANY, &a).await.unwrap();

        let err = repo.insert(COMPANY, &b).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_is_per_company() {
        let db = database().await;
        let repo = db.accounts();
        repo.insert(COMPANY, &Account::new("a1", "6000", "Purchases", AccountKind::Expense).unwrap())
            .await
            .unwrap();
        repo.insert("other", &Account::new("a2", "6000", "Purchases", AccountKind::Expense).unwrap())
            .await
            .unwrap();

        assert_eq!(repo.list(COMPANY).await.unwrap().len(), 1);
        assert!(matches!(
            repo.first_of_kind(COMPANY, AccountKind::Tax).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
