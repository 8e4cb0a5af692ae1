//! Session cookie authentication.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{Identity, SessionError};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Read the session token from the configured cookie.
pub fn session_token(jar: &CookieJar, cookie_name: &str) -> Option<String> {
    jar.get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Extractor for requests carrying a valid session.
///
/// Rejects with 401 when the cookie is missing or the session is unknown,
/// revoked or expired.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// Session owner.
    pub identity: Identity,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let token = session_token(&jar, &app_state.cookie_name).ok_or_else(|| {
            tracing::debug!("Request without session cookie");
            ApiError::from(SessionError::Unauthorized)
        })?;

        let identity = app_state.sessions.validate(&token)?;

        Ok(SessionUser { identity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_session_token_present() {
        let jar = CookieJar::new().add(Cookie::new("session_token", "abc"));
        assert_eq!(session_token(&jar, "session_token"), Some("abc".to_string()));
    }

    #[test]
    fn test_session_token_missing_or_empty() {
        let jar = CookieJar::new();
        assert_eq!(session_token(&jar, "session_token"), None);

        let jar = CookieJar::new().add(Cookie::new("session_token", ""));
        assert_eq!(session_token(&jar, "session_token"), None);

        let jar = CookieJar::new().add(Cookie::new("other", "abc"));
        assert_eq!(session_token(&jar, "session_token"), None);
    }
}
