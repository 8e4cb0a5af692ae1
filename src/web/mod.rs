//! Web API module for authgate.
//!
//! This module exposes registration, login and session lifecycle over HTTP.
//! Sessions travel in an HttpOnly cookie.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
