//! Session management for authgate.
//!
//! Sessions are opaque random tokens mapped to an identity and an absolute
//! expiry, held in process memory behind a single lock. Expiry is lazy: a
//! record is removed when it is found expired on access. An optional reaper
//! task can purge expired records in the background.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::login::Identity;

/// Default session lifetime (2 minutes).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 120;

/// Session-related errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The token is unknown, revoked, rotated away, or expired.
    #[error("unauthorized")]
    Unauthorized,
}

/// A live session entry.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Who the session belongs to.
    pub identity: Identity,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A freshly issued session, to be handed to the client.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Bearer token.
    pub token: String,
    /// Who the session belongs to.
    pub identity: Identity,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

/// Shortened token for log output.
fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

/// In-memory session store with issue / validate / rotate / revoke.
///
/// Every operation takes the lock once, so each lookup, expiry check and
/// delete (or insert) happens as one critical section.
#[derive(Debug)]
pub struct SessionManager {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    ttl: chrono::Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionManager {
    /// Create a session manager issuing sessions with the given lifetime.
    pub fn new(ttl: Duration) -> Self {
        // Clamp TTLs chrono cannot represent.
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(3650));

        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Issue a new session for an authenticated identity.
    pub fn issue(&self, identity: Identity) -> IssuedSession {
        let mut sessions = self.sessions.lock();
        let session = self.insert_locked(&mut sessions, identity);

        info!(
            username = %session.identity,
            token = %token_prefix(&session.token),
            expires_at = %session.expires_at,
            "Session issued"
        );

        session
    }

    fn insert_locked(
        &self,
        sessions: &mut HashMap<String, SessionRecord>,
        identity: Identity,
    ) -> IssuedSession {
        let mut token = Uuid::new_v4().to_string();
        while sessions.contains_key(&token) {
            token = Uuid::new_v4().to_string();
        }

        let expires_at = Utc::now() + self.ttl;
        sessions.insert(
            token.clone(),
            SessionRecord {
                identity: identity.clone(),
                expires_at,
            },
        );

        IssuedSession {
            token,
            identity,
            expires_at,
        }
    }

    /// Resolve a token to its identity.
    ///
    /// An expired record is deleted on the spot.
    pub fn validate(&self, token: &str) -> Result<Identity, SessionError> {
        let mut sessions = self.sessions.lock();
        let now = Utc::now();

        match sessions.get(token) {
            None => {
                debug!(token = %token_prefix(token), "Session not found");
                Err(SessionError::Unauthorized)
            }
            Some(record) if record.is_expired_at(now) => {
                sessions.remove(token);
                debug!(token = %token_prefix(token), "Session expired");
                Err(SessionError::Unauthorized)
            }
            Some(record) => Ok(record.identity.clone()),
        }
    }

    /// Replace a valid token with a fresh one for the same identity.
    ///
    /// The old token is retired whether or not rotation succeeds: an expired
    /// token is deleted and rejected, a valid one is deleted and replaced.
    pub fn rotate(&self, token: &str) -> Result<IssuedSession, SessionError> {
        let mut sessions = self.sessions.lock();
        let now = Utc::now();

        let record = sessions.remove(token).ok_or(SessionError::Unauthorized)?;
        if record.is_expired_at(now) {
            debug!(token = %token_prefix(token), "Rotation refused: session expired");
            return Err(SessionError::Unauthorized);
        }

        let session = self.insert_locked(&mut sessions, record.identity);

        info!(
            username = %session.identity,
            old_token = %token_prefix(token),
            token = %token_prefix(&session.token),
            "Session rotated"
        );

        Ok(session)
    }

    /// Delete a session. Returns whether a record was removed.
    ///
    /// Revoking an unknown or already revoked token is not an error.
    pub fn revoke(&self, token: &str) -> bool {
        match self.sessions.lock().remove(token) {
            Some(record) => {
                info!(
                    username = %record.identity,
                    token = %token_prefix(token),
                    "Session revoked"
                );
                true
            }
            None => {
                debug!(token = %token_prefix(token), "Revoke: session not found");
                false
            }
        }
    }

    /// Remove every expired record. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let now = Utc::now();
        let before = sessions.len();

        sessions.retain(|_, record| !record.is_expired_at(now));

        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed = removed, "Purged expired sessions");
        }
        removed
    }

    /// Number of stored records, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether no records are stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Start a background task that purges expired records every `period`.
    ///
    /// The task holds only a weak reference and exits once the manager is
    /// dropped.
    pub fn spawn_reaper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let manager: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                let Some(manager) = manager.upgrade() else {
                    debug!("Session manager dropped, reaper exiting");
                    break;
                };

                let removed = manager.purge_expired();
                if removed > 0 {
                    info!(removed = removed, "Reaped expired sessions");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn alice() -> Identity {
        Identity::new("alice")
    }

    #[test]
    fn test_issue_then_validate() {
        let manager = SessionManager::default();
        let session = manager.issue(alice());

        assert!(!session.token.is_empty());
        assert_eq!(session.identity, alice());
        assert_eq!(manager.validate(&session.token), Ok(alice()));
    }

    #[test]
    fn test_issue_expiry_uses_ttl() {
        let manager = SessionManager::default();
        let before = Utc::now();
        let session = manager.issue(alice());

        let lifetime = session.expires_at - before;
        assert!(lifetime.num_seconds() <= 120);
        assert!(lifetime.num_seconds() >= 119);
    }

    #[test]
    fn test_tokens_unique() {
        let manager = SessionManager::default();
        let first = manager.issue(alice());
        let second = manager.issue(alice());

        assert_ne!(first.token, second.token);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_validate_unknown_token() {
        let manager = SessionManager::default();
        assert_eq!(
            manager.validate("no-such-token"),
            Err(SessionError::Unauthorized)
        );
    }

    #[test]
    fn test_expired_session_is_removed() {
        let manager = SessionManager::new(Duration::from_millis(50));
        let session = manager.issue(alice());

        sleep(Duration::from_millis(100));

        assert_eq!(
            manager.validate(&session.token),
            Err(SessionError::Unauthorized)
        );
        assert!(manager.is_empty());
        // Still rejected on the next access.
        assert_eq!(
            manager.validate(&session.token),
            Err(SessionError::Unauthorized)
        );
    }

    #[test]
    fn test_rotate_retires_old_token() {
        let manager = SessionManager::default();
        let old = manager.issue(alice());

        let new = manager.rotate(&old.token).unwrap();

        assert_ne!(new.token, old.token);
        assert_eq!(new.identity, alice());
        assert_eq!(manager.validate(&old.token), Err(SessionError::Unauthorized));
        assert_eq!(manager.validate(&new.token), Ok(alice()));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_rotate_refreshes_expiry() {
        let manager = SessionManager::new(Duration::from_millis(500));
        let old = manager.issue(alice());

        sleep(Duration::from_millis(100));
        let new = manager.rotate(&old.token).unwrap();

        assert!(new.expires_at > old.expires_at);
    }

    #[test]
    fn test_rotate_expired_token() {
        let manager = SessionManager::new(Duration::from_millis(50));
        let session = manager.issue(alice());

        sleep(Duration::from_millis(100));

        assert_eq!(
            manager.rotate(&session.token).unwrap_err(),
            SessionError::Unauthorized
        );
        assert!(manager.is_empty());
    }

    #[test]
    fn test_rotate_unknown_token() {
        let manager = SessionManager::default();
        assert!(manager.rotate("no-such-token").is_err());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_revoke_idempotent() {
        let manager = SessionManager::default();
        let session = manager.issue(alice());

        assert!(manager.revoke(&session.token));
        assert!(!manager.revoke(&session.token));
        assert!(!manager.revoke("never-issued"));
        assert_eq!(manager.validate(&session.token), Err(SessionError::Unauthorized));
    }

    #[test]
    fn test_revoke_leaves_other_sessions() {
        let manager = SessionManager::default();
        let first = manager.issue(alice());
        let second = manager.issue(alice());

        manager.revoke(&first.token);

        assert_eq!(manager.validate(&second.token), Ok(alice()));
    }

    #[test]
    fn test_purge_expired() {
        let manager = SessionManager::new(Duration::from_millis(50));
        manager.issue(alice());
        manager.issue(Identity::new("bob"));

        sleep(Duration::from_millis(100));

        assert_eq!(manager.purge_expired(), 2);
        assert!(manager.is_empty());
        assert_eq!(manager.purge_expired(), 0);
    }

    #[test]
    fn test_purge_keeps_live_sessions() {
        let manager = SessionManager::default();
        let session = manager.issue(alice());

        assert_eq!(manager.purge_expired(), 0);
        assert_eq!(manager.validate(&session.token), Ok(alice()));
    }

    #[test]
    fn test_concurrent_rotation_single_winner() {
        let manager = Arc::new(SessionManager::default());
        let session = manager.issue(alice());

        let successes: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let manager = Arc::clone(&manager);
                    let token = session.token.clone();
                    scope.spawn(move || manager.rotate(&token).is_ok())
                })
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(successes, 1);
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_reaper_purges_in_background() {
        let manager = Arc::new(SessionManager::new(Duration::from_millis(20)));
        manager.issue(alice());

        let handle = manager.spawn_reaper(Duration::from_millis(30));
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(manager.is_empty());
        handle.abort();
    }

    #[tokio::test]
    async fn test_reaper_exits_when_manager_dropped() {
        let manager = Arc::new(SessionManager::default());
        let handle = manager.spawn_reaper(Duration::from_millis(10));

        drop(manager);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reaper should exit")
            .unwrap();
    }

    #[test]
    fn test_session_error_display() {
        assert_eq!(SessionError::Unauthorized.to_string(), "unauthorized");
    }
}
