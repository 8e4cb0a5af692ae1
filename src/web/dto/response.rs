//! Response DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Registration response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// New record ID.
    pub id: i64,
    /// Registered username.
    pub username: String,
}

/// Login and refresh response.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Session owner.
    pub username: String,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

/// Front page response.
#[derive(Debug, Serialize)]
pub struct FrontPageResponse {
    /// Signed-in username.
    pub username: String,
}
