//! Middleware and extractors for Web API.

pub mod auth;

pub use auth::{session_token, SessionUser};
