//! Browser-facing response headers for everything the gateway serves,
//! pages and proxied API replies alike.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{CACHE_CONTROL, SET_COOKIE},
        HeaderValue, Request, Response,
    },
    middleware::Next,
};

use crate::state::AppState;

/// Harden every response on its way out
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let mut response = next.run(request).await;
    let sets_cookie = response.headers().contains_key(SET_COOKIE);
    let headers = response.headers_mut();

    // Pages are never framed
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );

    // Store hostnames stay out of third-party referrers
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    // Strict-Transport-Security only once cookies are Secure, or local
    // development over plain HTTP gets pinned to HTTPS
    if state.config().secure_cookies {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        );
    }

    // Credentials must never sit in a shared cache
    if sets_cookie || !headers.contains_key(CACHE_CONTROL) {
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
        );
    }

    response
}
