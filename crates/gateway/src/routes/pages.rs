//! Page entry
//!
//! Requests the edge gate allowed and no API route claimed land here. This
//! is where the renderer takes over; the gateway resolves tenant and
//! identity for it and applies the redirects that need the backend.

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use lotline_shared::{SessionIdentity, TenantContext};
use serde::Serialize;

use crate::error::GatewayError;
use crate::gate::is_within;
use crate::routing::{canonical_path, resolve_tenant_context, ClientHost};
use crate::session::{cookies, refresh_access_token, resolve_identity, SessionCredentials};
use crate::state::AppState;

/// Everything the renderer needs to draw a page
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub host: String,
    pub path: String,
    pub tenant: TenantContext,
    pub identity: Option<SessionIdentity>,
}

pub async fn page_entry(
    State(state): State<AppState>,
    host: ClientHost,
    jar: CookieJar,
    uri: Uri,
) -> Response {
    // The gate already redirected non-canonical page paths; this only
    // decodes what is left
    let path = canonical_path(uri.path()).unwrap_or_else(|| uri.path().to_string());
    let config = state.config();
    let paths = &config.paths;

    if is_within(&path, "/api") {
        return GatewayError::NotFound.into_response();
    }

    let tenant = resolve_tenant_context(state.backend(), host.as_str()).await;
    if tenant.is_unknown() && !is_within(&path, &paths.domain_not_found) {
        return Redirect::temporary(&paths.domain_not_found).into_response();
    }

    let credentials = SessionCredentials::from_jar(&jar);
    let mut identity =
        resolve_identity(state.backend(), &config.master_hosts, host.as_str(), &credentials).await;
    let mut jar = jar;

    if identity.is_none() && !paths.is_public(&path) {
        // Same single refresh the forwarding proxy performs
        if let Some(token) = refresh_access_token(state.backend(), host.as_str(), &credentials).await {
            let refreshed = credentials.with_access_token(token.clone());
            identity =
                resolve_identity(state.backend(), &config.master_hosts, host.as_str(), &refreshed).await;
            jar = jar.add(cookies::access_cookie(&token, config.secure_cookies));
        }

        if identity.is_none() {
            return Redirect::temporary(&paths.login).into_response();
        }
    }

    let context = PageContext {
        host: host.0,
        path,
        tenant,
        identity,
    };
    (jar, Json(context)).into_response()
}
