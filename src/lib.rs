//! authgate - account registration, login and session lifecycle.
//!
//! Users register with a username and password, log in to obtain a
//! short-lived session token, and can rotate or revoke that token. Passwords
//! are stored as salted Argon2id hashes in SQLite; sessions live in memory.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    authenticate, register, AuthError, HashingError, Identity, IssuedSession, PasswordHasher,
    RegistrationError, RegistrationRequest, SessionError, SessionManager, ValidationError,
};
pub use config::Config;
pub use db::{Credential, CredentialRepository, CredentialStore, Database, StoreError};
pub use error::{AuthgateError, Result};
pub use web::{create_router, AppState, WebServer};
