//! Authentication module for authgate.
//!
//! This module provides password hashing, registration, login and
//! session management.

mod login;
mod password;
mod registration;
mod session;
pub mod validation;

pub use login::{authenticate, AuthError, Identity};
pub use password::{HashingError, PasswordHasher};
pub use registration::{
    register, validate_registration, Accepted, RegistrationError, RegistrationRequest,
};
pub use session::{
    IssuedSession, SessionError, SessionManager, SessionRecord, DEFAULT_SESSION_TTL_SECS,
};
pub use validation::ValidationError;
