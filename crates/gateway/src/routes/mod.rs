//! HTTP routes

pub mod health;
pub mod pages;
pub mod session;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{any, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::gate::edge_gate_middleware;
use crate::proxy::forward_handler;
use crate::security::security_headers_middleware;
use crate::state::AppState;

/// Create the gateway router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config().max_request_body_bytes;

    let session_routes = Router::new()
        .route("/api/session", get(session::current))
        .route("/api/session/login", post(session::login))
        .route("/api/session/logout", post(session::logout))
        .route(
            "/api/session/support",
            post(session::enter_support).delete(session::exit_support),
        );

    let proxy_routes = Router::new()
        .route("/api/proxy/*path", any(forward_handler))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/api/health", get(health::health))
        .merge(session_routes)
        .merge(proxy_routes)
        .fallback(pages::page_entry)
        // The gate sees every request first, pages and API alike
        .layer(middleware::from_fn_with_state(state.clone(), edge_gate_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
