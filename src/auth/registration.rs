//! User registration for authgate.
//!
//! Validation and persistence are separate steps: [`validate_registration`]
//! only reads the store, and a record is written by [`register`] only after
//! every rule has passed, so a rejected registration never leaves a partial
//! record behind.

use thiserror::Error;
use tracing::{debug, error, info};

use crate::auth::password::{HashingError, PasswordHasher};
use crate::auth::validation::{validate_shape, ValidationError};
use crate::db::{CredentialStore, RecordId, StoreError};

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// The request was rejected by a validation rule.
    #[error("{0}")]
    Rejected(#[from] ValidationError),

    /// Password hashing failed.
    #[error("password error: {0}")]
    Hashing(#[from] HashingError),

    /// The credential store failed.
    #[error("store error: {0}")]
    Store(StoreError),
}

/// Registration request data.
#[derive(Clone)]
pub struct RegistrationRequest {
    /// Desired username (at least 3 bytes, case-sensitive).
    pub username: String,
    /// Plaintext password (at least 6 bytes).
    pub password: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// A registration request that passed every validation rule.
///
/// Only [`validate_registration`] creates one.
#[derive(Debug)]
pub struct Accepted {
    request: RegistrationRequest,
}

impl Accepted {
    /// The accepted username.
    pub fn username(&self) -> &str {
        &self.request.username
    }
}

/// Validate a registration request.
///
/// Rules, first failure wins:
/// 1. the username must not already exist in the store
/// 2. the username must be at least 3 bytes
/// 3. the password must be at least 6 bytes
///
/// Performs one read against the store and no writes.
pub async fn validate_registration<S>(
    store: &S,
    request: RegistrationRequest,
) -> Result<Accepted, RegistrationError>
where
    S: CredentialStore + ?Sized,
{
    let existing = store
        .find_by_username(&request.username)
        .await
        .map_err(RegistrationError::Store)?;
    if existing.is_some() {
        return Err(ValidationError::UsernameTaken.into());
    }

    validate_shape(&request.username, &request.password)?;

    Ok(Accepted { request })
}

/// Register a new user.
///
/// Validates the request, hashes the password off the async executor, and
/// writes the credential record. A uniqueness conflict raised by the store
/// (two registrations racing past validation) is reported as
/// [`ValidationError::UsernameTaken`].
///
/// # Examples
///
/// ```ignore
/// let db = Database::open_in_memory().await?;
/// let repo = CredentialRepository::new(db.pool().clone());
///
/// let id = register(&repo, &hasher, RegistrationRequest::new("alice", "secret1")).await?;
/// ```
pub async fn register<S>(
    store: &S,
    hasher: &PasswordHasher,
    request: RegistrationRequest,
) -> Result<RecordId, RegistrationError>
where
    S: CredentialStore + ?Sized,
{
    let accepted = match validate_registration(store, request).await {
        Ok(accepted) => accepted,
        Err(e) => {
            debug!(error = %e, "Registration rejected");
            return Err(e);
        }
    };

    let password_hash = hasher.hash_blocking(&accepted.request.password).await?;

    let id = match store.insert(accepted.username(), &password_hash).await {
        Ok(id) => id,
        Err(StoreError::Conflict) => {
            debug!(
                username = %accepted.username(),
                "Registration lost uniqueness race"
            );
            return Err(ValidationError::UsernameTaken.into());
        }
        Err(e) => {
            error!(error = %e, "Failed to store credential record");
            return Err(RegistrationError::Store(e));
        }
    };

    info!(username = %accepted.username(), user_id = id, "New user registered");

    Ok(id)
}
