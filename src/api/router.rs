use axum::{middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::accounts::{self, ACCOUNTS_PATH};
use super::auth;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware, security_headers_middleware};
use super::state::AppState;

/// Create the full router with application state
///
/// `login_endpoint` is the configured path of the login route.
pub fn create_router_with_state(state: AppState, login_endpoint: &str) -> Router {
    Router::new()
        // Probes
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Login (public)
        .merge(auth::create_auth_router(login_endpoint))
        // Account lifecycle; protected groups carry their own gate
        .nest(ACCOUNTS_PATH, accounts::create_accounts_router(state.clone()))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
