//! Account repository for database operations.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::Account;

/// Read-only account lookup used by the authentication gate.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find the account whose `external_id` equals `external_id`.
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Account>>;
}

/// Repository for account database operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Create a new account repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    #[instrument(skip(self))]
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, external_id, email, display_name, is_active, created_at, updated_at
            FROM accounts
            WHERE external_id = ?
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account by external id")?;

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn insert(pool: &SqlitePool, id: &str, external_id: &str, is_active: bool) {
        sqlx::query(
            "INSERT INTO accounts (id, external_id, email, display_name, is_active) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(external_id)
        .bind(format!("{id}@example.com"))
        .bind("Test User")
        .bind(is_active)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_find_by_external_id() {
        let db = Database::in_memory().await.unwrap();
        insert(db.pool(), "acc-1", "abc123", true).await;
        insert(db.pool(), "acc-2", "def456", false).await;
        let repo = AccountRepository::new(db.pool().clone());

        let account = repo.find_by_external_id("abc123").await.unwrap().unwrap();
        assert_eq!(account.id, "acc-1");
        assert!(account.is_active);
        assert_eq!(account.email.as_deref(), Some("acc-1@example.com"));

        let inactive = repo.find_by_external_id("def456").await.unwrap().unwrap();
        assert!(!inactive.is_active);
    }

    #[tokio::test]
    async fn test_find_by_external_id_exact_match() {
        let db = Database::in_memory().await.unwrap();
        insert(db.pool(), "acc-1", "abc123", true).await;
        let repo = AccountRepository::new(db.pool().clone());

        assert!(repo.find_by_external_id("ABC123").await.unwrap().is_none());
        assert!(repo.find_by_external_id("abc").await.unwrap().is_none());
        assert!(repo.find_by_external_id("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_does_not_modify_account() {
        let db = Database::in_memory().await.unwrap();
        insert(db.pool(), "acc-1", "abc123", true).await;
        let repo = AccountRepository::new(db.pool().clone());

        let first = repo.find_by_external_id("abc123").await.unwrap();
        let second = repo.find_by_external_id("abc123").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_closed_pool_is_an_error() {
        let db = Database::in_memory().await.unwrap();
        let repo = AccountRepository::new(db.pool().clone());
        db.pool().close().await;

        assert!(repo.find_by_external_id("abc123").await.is_err());
    }
}
