//! Password hashing and verification for authgate.
//!
//! Uses Argon2id with tunable cost parameters. Hashes are PHC strings that
//! carry their own salt and parameters, so verification always uses the
//! parameters a hash was created with.

use argon2::{
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{error, warn};

use crate::config::HashingConfig;

/// Password hashing errors.
///
/// Only raised on internal failure, never because of the password itself.
#[derive(Error, Debug)]
pub enum HashingError {
    /// Cost parameters were rejected by Argon2.
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Hashing failed.
    #[error("password hashing failed: {0}")]
    Failed(String),
}

/// Plaintext behind the decoy hash checked for unknown usernames.
const DECOY_PASSWORD: &str = "authgate-decoy-password";

/// Salted, one-way password hasher.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    decoy_hash: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Create a hasher with the configured cost parameters.
    pub fn new(config: &HashingConfig) -> Result<Self, HashingError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| HashingError::InvalidParams(e.to_string()))?;

        Ok(Self::with_params(params))
    }

    fn with_params(params: Params) -> Self {
        Self {
            params,
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Examples
    ///
    /// ```
    /// use authgate::auth::PasswordHasher;
    /// use authgate::config::HashingConfig;
    ///
    /// let config = HashingConfig { memory_kib: 1024, iterations: 1, parallelism: 1 };
    /// let hasher = PasswordHasher::new(&config).unwrap();
    /// let hash = hasher.hash("secret1").unwrap();
    /// assert!(hash.starts_with("$argon2id$"));
    /// assert!(hasher.verify("secret1", &hash));
    /// ```
    pub fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashingError::Failed(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Check a password against a stored hash.
    ///
    /// A mismatch is `false`, not an error. A stored hash that cannot be
    /// parsed also yields `false`.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        // Parameters come from the parsed hash, not from self.params.
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run a verification that always fails, at the cost of a real one.
    ///
    /// Used when no stored hash exists, so a login for an unknown username
    /// takes as long as one with a wrong password. The decoy hash is created
    /// with this hasher's parameters on first use.
    pub fn verify_decoy(&self, plaintext: &str) {
        let decoy = self
            .decoy_hash
            .get_or_init(|| self.hash(DECOY_PASSWORD).unwrap_or_default());
        // A password equal to the decoy must still fail.
        let _ = self.verify(plaintext, decoy);
    }

    /// [`verify_decoy`](Self::verify_decoy) on the blocking thread pool.
    pub async fn verify_decoy_blocking(&self, plaintext: &str) {
        let hasher = self.clone();
        let plaintext = plaintext.to_owned();
        if let Err(e) = tokio::task::spawn_blocking(move || hasher.verify_decoy(&plaintext)).await {
            error!(error = %e, "Decoy verification task failed");
        }
    }

    /// Whether the decoy hash has been created.
    pub fn decoy_ready(&self) -> bool {
        self.decoy_hash.get().is_some()
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_blocking(&self, plaintext: &str) -> Result<String, HashingError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| HashingError::Failed(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_blocking(&self, plaintext: &str, hash: &str) -> bool {
        let hasher = self.clone();
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        match tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash)).await {
            Ok(matched) => matched,
            Err(e) => {
                error!(error = %e, "Password verification task failed");
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::with_params(Params::new(65536, 3, 4, None).unwrap_or_default())
    }
}
