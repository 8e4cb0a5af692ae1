//! Authentication handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;

use crate::auth::{
    authenticate, HashingError, IssuedSession, PasswordHasher, SessionError, SessionManager,
};
use crate::config::Config;
use crate::db::{CredentialRepository, CredentialStore, Database};
use crate::web::dto::{
    ApiJson, ApiResponse, FrontPageResponse, LoginRequest, RegisterRequest, RegisterResponse,
    SessionResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::{session_token, SessionUser};

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "session_token";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Credential store.
    pub store: Arc<dyn CredentialStore>,
    /// Password hasher.
    pub hasher: PasswordHasher,
    /// Live sessions.
    pub sessions: Arc<SessionManager>,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            store,
            hasher,
            sessions,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }

    /// Build the state from configuration over an open database.
    pub fn from_config(db: &Database, config: &Config) -> Result<Self, HashingError> {
        let store = Arc::new(CredentialRepository::new(db.pool().clone()));
        let hasher = PasswordHasher::new(&config.hashing)?;
        let sessions = Arc::new(SessionManager::new(std::time::Duration::from_secs(
            config.session.ttl_secs,
        )));

        Ok(Self::new(store, hasher, sessions).with_cookie_name(&config.session.cookie_name))
    }

    /// Cookie carrying a session token until the session expires.
    fn session_cookie(&self, session: &IssuedSession) -> Result<Cookie<'static>, ApiError> {
        let expires = OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp())
            .map_err(|e| {
                tracing::error!("Session expiry out of range: {}", e);
                ApiError::internal()
            })?;

        Ok(Cookie::build((self.cookie_name.clone(), session.token.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .expires(expires)
            .build())
    }

    /// Cookie that clears the session cookie on the client.
    fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), "")).path("/").build()
    }

    fn session_response(
        &self,
        jar: CookieJar,
        session: IssuedSession,
    ) -> Result<(CookieJar, Json<ApiResponse<SessionResponse>>), ApiError> {
        let cookie = match self.session_cookie(&session) {
            Ok(cookie) => cookie,
            Err(e) => {
                self.sessions.revoke(&session.token);
                return Err(e);
            }
        };

        let response = SessionResponse {
            username: session.identity.username().to_string(),
            expires_at: session.expires_at,
        };

        Ok((jar.add(cookie), Json(ApiResponse::new(response))))
    }
}

/// POST /register - User registration.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    let username = req.username.clone();
    let id = crate::auth::register(&*state.store, &state.hasher, req.into()).await?;

    let response = RegisterResponse { id, username };

    Ok((StatusCode::CREATED, Json(ApiResponse::new(response))))
}

/// POST /login - User login.
///
/// Issues a session and sets the session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<SessionResponse>>), ApiError> {
    let identity = authenticate(&*state.store, &state.hasher, &req.username, &req.password).await?;
    let session = state.sessions.issue(identity);

    state.session_response(jar, session)
}

/// GET / - Front page for signed-in users.
pub async fn front_page(
    SessionUser { identity }: SessionUser,
) -> Json<ApiResponse<FrontPageResponse>> {
    Json(ApiResponse::new(FrontPageResponse {
        username: identity.username().to_string(),
    }))
}

/// POST /refresh - Rotate the session token.
///
/// On failure the session cookie is cleared.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<SessionResponse>>), (CookieJar, ApiError)> {
    let Some(token) = session_token(&jar, &state.cookie_name) else {
        return Err((jar, SessionError::Unauthorized.into()));
    };

    match state.sessions.rotate(&token) {
        Ok(session) => state
            .session_response(jar.clone(), session)
            .map_err(|e| (jar, e)),
        Err(e) => {
            let jar = jar.remove(state.removal_cookie());
            Err((jar, e.into()))
        }
    }
}

/// POST /logout - Revoke the session and clear the cookie.
///
/// Logging out an already revoked or expired session still succeeds.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>), ApiError> {
    let token = session_token(&jar, &state.cookie_name).ok_or(SessionError::Unauthorized)?;

    state.sessions.revoke(&token);

    let jar = jar.remove(state.removal_cookie());
    Ok((jar, Json(ApiResponse::new(()))))
}

/// GET /health - Health check.
pub async fn health_check() -> &'static str {
    "OK"
}
