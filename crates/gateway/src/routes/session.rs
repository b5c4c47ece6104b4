//! Session endpoints
//!
//! The gateway owns the credential lifecycle: cookies are created at login,
//! the support selector is set and cleared here, and all three cookies are
//! removed together at logout.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use lotline_shared::{SessionIdentity, StoreId, TenantContext, TokenPair};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::proxy::normalize_body;
use crate::routing::{resolve_tenant_context, ClientHost};
use crate::session::{cookies, resolve_identity, SessionCredentials};
use crate::state::AppState;
use crate::trust::{apply_trust_headers, forwardable_headers, tenant_scope};

/// What client code needs to know about the current session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub tenant: TenantContext,
    pub identity: Option<SessionIdentity>,
    /// Only reported when it would actually be forwarded
    pub support_store_id: Option<StoreId>,
}

/// GET /api/session
pub async fn current(
    State(state): State<AppState>,
    host: ClientHost,
    jar: CookieJar,
) -> Json<SessionView> {
    let credentials = SessionCredentials::from_jar(&jar);
    let config = state.config();

    let (tenant, identity) = tokio::join!(
        resolve_tenant_context(state.backend(), host.as_str()),
        resolve_identity(state.backend(), &config.master_hosts, host.as_str(), &credentials),
    );

    Json(SessionView {
        tenant,
        identity,
        support_store_id: tenant_scope(host.as_str(), &credentials, &config.master_hosts),
    })
}

/// POST /api/session/login
///
/// Relays the browser's JSON body to the backend. On success both
/// credentials are stored as cookies and stripped from the reply.
pub async fn login(
    State(state): State<AppState>,
    host: ClientHost,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> GatewayResult<Response> {
    let mut outbound = forwardable_headers(&headers);
    // A login never carries an old session or a store scope
    apply_trust_headers(&mut outbound, host.as_str(), None, None);

    let reply = state.backend().login(outbound, body).await.map_err(|e| {
        tracing::error!(host = %host.as_str(), error = %e, "Login request failed");
        GatewayError::BackendUnavailable
    })?;

    let mut body = normalize_body(&reply.body);
    if !reply.status.is_success() {
        tracing::debug!(host = %host.as_str(), status = reply.status.as_u16(), "Login rejected");
        return Ok((reply.status, Json(body)).into_response());
    }

    let tokens: TokenPair = serde_json::from_value(body.clone()).map_err(|e| {
        tracing::error!(host = %host.as_str(), error = %e, "Login reply carried no token pair");
        GatewayError::BackendUnavailable
    })?;

    if let Value::Object(map) = &mut body {
        map.remove("accessToken");
        map.remove("refreshToken");
    }

    let secure = state.config().secure_cookies;
    let jar = jar
        .add(cookies::access_cookie(&tokens.access_token, secure))
        .add(cookies::refresh_cookie(&tokens.refresh_token, secure))
        // A fresh session starts outside support mode
        .add(cookies::clear_support_cookie(secure));

    tracing::info!(host = %host.as_str(), "Session created");
    Ok((jar, (reply.status, Json(body))).into_response())
}

/// POST /api/session/logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = cookies::clear_session_cookies(state.config().secure_cookies)
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie));
    (jar, StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
    pub store_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportResponse {
    pub support_store_id: StoreId,
}

/// POST /api/session/support
///
/// Enter support mode for one store. Master host and super admins only.
pub async fn enter_support(
    State(state): State<AppState>,
    host: ClientHost,
    jar: CookieJar,
    body: Bytes,
) -> GatewayResult<(CookieJar, Json<SupportResponse>)> {
    let config = state.config();

    if !config.master_hosts.is_master_host(host.as_str()) {
        tracing::warn!(host = %host.as_str(), "Support mode requested on non-master host");
        return Err(GatewayError::Forbidden(
            "support mode is only available on the master host".into(),
        ));
    }

    let req: SupportRequest = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::BadRequest(format!("invalid support request: {e}")))?;
    let store_id = StoreId::parse(&req.store_id)
        .ok_or_else(|| GatewayError::BadRequest("storeId must be a UUID".into()))?;

    let credentials = SessionCredentials::from_jar(&jar);
    let identity = resolve_identity(state.backend(), &config.master_hosts, host.as_str(), &credentials)
        .await
        .ok_or(GatewayError::Unauthorized)?;

    if !identity.is_super_admin {
        tracing::warn!(user_id = %identity.id, "Non super admin attempted support mode");
        return Err(GatewayError::Forbidden("super admin required".into()));
    }

    tracing::info!(user_id = %identity.id, store_id = %store_id, "Entering support mode");
    let jar = jar.add(cookies::support_cookie(store_id, config.secure_cookies));
    Ok((jar, Json(SupportResponse { support_store_id: store_id })))
}

/// DELETE /api/session/support
pub async fn exit_support(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.add(cookies::clear_support_cookie(state.config().secure_cookies));
    (jar, StatusCode::NO_CONTENT)
}
