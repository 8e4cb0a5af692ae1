//! Router configuration for Web API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{front_page, health_check, login, logout, refresh, register, AppState};

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Session lifecycle routes
    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout));

    Router::new()
        .route("/", get(front_page))
        .merge(auth_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
        .merge(create_health_router())
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}
