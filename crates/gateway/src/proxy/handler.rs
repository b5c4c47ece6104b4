//! HTTP entry point for the forwarding proxy

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;

use crate::error::GatewayError;
use crate::routing::ClientHost;
use crate::session::{cookies, SessionCredentials};
use crate::state::AppState;

use super::{Attempt, ForwardRequest};

/// Mount point; `/api/proxy/vehicles?x=1` goes to `{backend}/vehicles?x=1`
pub const PROXY_PREFIX: &str = "/api/proxy";

/// Forward any method under [`PROXY_PREFIX`] to the backend
pub async fn forward_handler(
    State(state): State<AppState>,
    host: ClientHost,
    jar: CookieJar,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let path = uri
        .path()
        .strip_prefix(PROXY_PREFIX)
        .unwrap_or_default()
        .trim_start_matches('/')
        .to_string();

    let request = ForwardRequest {
        method,
        path,
        query: uri.query().map(str::to_string),
        headers,
        body,
        host: host.0,
    };
    let credentials = SessionCredentials::from_jar(&jar);

    let reply = state
        .proxy()
        .forward(&request, &credentials, Attempt::Initial)
        .await
        .map_err(|e| {
            tracing::error!(host = %request.host, path = %request.path, error = %e, "Backend unreachable");
            GatewayError::BackendUnavailable
        })?;

    let jar = match &reply.refreshed_access_token {
        Some(token) => jar.add(cookies::access_cookie(token, state.config().secure_cookies)),
        None => jar,
    };

    Ok((jar, (reply.status, Json(reply.body))).into_response())
}
