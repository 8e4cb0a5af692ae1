//! Login authentication.

use std::fmt;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::password::PasswordHasher;
use crate::db::{CredentialStore, StoreError};

/// Authenticated identity (the username of a registered user).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Wrap a username.
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    /// The username this identity refers to.
    pub fn username(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Login failures.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown username or wrong password; the two are indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The credential store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Verify a username / password pair against the store.
///
/// Returns the identity on success. An unknown user and a wrong password
/// both fail with [`AuthError::InvalidCredentials`].
pub async fn authenticate<S>(
    store: &S,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<Identity, AuthError>
where
    S: CredentialStore + ?Sized,
{
    let credential = match store.find_by_username(username).await {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            hasher.verify_decoy_blocking(password).await;
            warn!(username = %username, "Login failed: user not found");
            return Err(AuthError::InvalidCredentials);
        }
        Err(e) => {
            error!(error = %e, "Login failed: credential lookup error");
            return Err(e.into());
        }
    };

    if !hasher.verify_blocking(password, &credential.password_hash).await {
        warn!(username = %username, "Login failed: wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    info!(username = %credential.username, user_id = credential.id, "Login successful");

    Ok(Identity::new(credential.username))
}
