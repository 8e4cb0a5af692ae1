//! Credential repository for authgate.
//!
//! SQLite implementation of [`CredentialStore`].

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::credential::{Credential, RecordId};
use super::traits::{CredentialStore, StoreError};

/// Repository for credential records.
#[derive(Clone)]
pub struct CredentialRepository {
    pool: SqlitePool,
}

impl CredentialRepository {
    /// Create a new CredentialRepository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for CredentialRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<RecordId, StoreError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}
