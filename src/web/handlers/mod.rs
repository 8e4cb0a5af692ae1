//! API handlers for authgate.

pub mod auth;

pub use auth::*;
