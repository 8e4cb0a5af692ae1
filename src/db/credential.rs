//! Credential record model.

use std::fmt;

/// Identifier assigned to a stored credential record.
pub type RecordId = i64;

/// A persisted username / password-hash pair.
#[derive(Clone, sqlx::FromRow)]
pub struct Credential {
    /// Row ID.
    pub id: RecordId,
    /// Login username (unique, case-sensitive).
    pub username: String,
    /// Password hash (Argon2 PHC string).
    pub password_hash: String,
}

// The hash stays out of Debug output so it cannot end up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}
