//! Credential store abstraction.
//!
//! Registration and login reach persistence only through [`CredentialStore`].

use async_trait::async_trait;
use thiserror::Error;

use super::credential::{Credential, RecordId};

/// Errors raised by a credential store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The write collided with an existing record (uniqueness violation).
    #[error("conflicting write: record already exists")]
    Conflict,

    /// The underlying storage failed.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict,
            _ => StoreError::Unavailable(e.to_string()),
        }
    }
}

/// Persistence of credential records, queried by username.
///
/// Implementations must enforce username uniqueness themselves and report a
/// duplicate insert as [`StoreError::Conflict`]. The registration flow
/// relies on this to resolve concurrent sign-ups for the same name.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a credential record by exact (case-sensitive) username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError>;

    /// Insert a new credential record and return its ID.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<RecordId, StoreError>;

    /// Count stored credential records.
    async fn count(&self) -> Result<i64, StoreError>;
}
