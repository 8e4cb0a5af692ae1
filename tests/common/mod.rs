//! Test helpers for HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::COOKIE, HeaderValue};
use axum_test::{TestResponse, TestServer};
use serde_json::json;

use authgate::config::HashingConfig;
use authgate::{create_router, AppState, CredentialRepository, Database, PasswordHasher, SessionManager};

/// Cookie name used by the test app.
pub const COOKIE_NAME: &str = "session_token";

/// Hasher with minimal Argon2 cost.
pub fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::new(&HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid hashing params")
}

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub db: Database,
}

/// Create a test app over an in-memory database with the given session TTL.
pub async fn create_test_app_with_ttl(ttl: Duration) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let state = Arc::new(AppState::new(
        Arc::new(CredentialRepository::new(db.pool().clone())),
        cheap_hasher(),
        Arc::new(SessionManager::new(ttl)),
    ));

    let server =
        TestServer::new(create_router(Arc::clone(&state))).expect("Failed to create test server");

    TestApp { server, state, db }
}

/// Create a test app with the default session TTL.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_ttl(Duration::from_secs(120)).await
}

/// POST /register.
pub async fn register(server: &TestServer, username: &str, password: &str) -> TestResponse {
    server
        .post("/register")
        .json(&json!({ "username": username, "password": password }))
        .await
}

/// POST /login.
pub async fn login(server: &TestServer, username: &str, password: &str) -> TestResponse {
    server
        .post("/login")
        .json(&json!({ "username": username, "password": password }))
        .await
}

/// Register a user, log in, and return the session token.
pub async fn register_and_login(server: &TestServer, username: &str, password: &str) -> String {
    register(server, username, password).await.assert_status_success();
    let response = login(server, username, password).await;
    response.assert_status_ok();
    response.cookie(COOKIE_NAME).value().to_string()
}

/// `Cookie` header value carrying a session token.
pub fn session_header(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("{COOKIE_NAME}={token}")).expect("valid header value")
}

/// GET / with the given session token.
pub async fn front_page(server: &TestServer, token: &str) -> TestResponse {
    server.get("/").add_header(COOKIE, session_header(token)).await
}

/// POST /refresh with the given session token.
pub async fn refresh(server: &TestServer, token: &str) -> TestResponse {
    server
        .post("/refresh")
        .add_header(COOKIE, session_header(token))
        .await
}

/// POST /logout with the given session token.
pub async fn logout(server: &TestServer, token: &str) -> TestResponse {
    server
        .post("/logout")
        .add_header(COOKIE, session_header(token))
        .await
}
