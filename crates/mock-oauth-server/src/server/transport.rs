//! HTTP transport: router and shared handler state.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::oauth::AuthorizationCoordinator;

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub coordinator: AuthorizationCoordinator,
    /// Base URL for endpoint announcements.
    pub base_url: String,
}

/// Create the HTTP router for the mock provider.
pub fn create_router(coordinator: AuthorizationCoordinator, base_url: impl Into<String>) -> Router {
    let state = Arc::new(HttpState { coordinator, base_url: base_url.into() });

    Router::new()
        .route("/", get(handlers::handle_home))
        .route("/health", get(handlers::handle_health))
        .route("/{tenant_id}/oauth2/v2.0/authorize", get(handlers::handle_authorize))
        .route("/{tenant_id}/oauth2/v2.0/login", post(handlers::handle_login))
        .route("/{tenant_id}/oauth2/v2.0/token", post(handlers::handle_token))
        .route(
            "/{tenant_id}/v2.0/.well-known/openid-configuration",
            get(handlers::handle_openid_configuration),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
