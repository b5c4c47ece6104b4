//! Trust headers on outbound backend calls
//!
//! The backend believes three headers from the gateway and nobody else:
//! - `x-forwarded-host`: the normalized host the browser asked for (always)
//! - `authorization`: the access credential as a bearer token (when present)
//! - `x-store-id`: the support-mode store (master hosts with a valid selector only)
//!
//! Any copy of these the browser sent is overwritten or removed here.

use axum::http::{
    header::{
        ACCEPT_ENCODING, AUTHORIZATION, CONNECTION, CONTENT_LENGTH, COOKIE, HOST,
        PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
    },
    HeaderMap, HeaderName, HeaderValue,
};
use lotline_shared::StoreId;

use crate::routing::MasterHosts;
use crate::session::SessionCredentials;

pub const FORWARDED_HOST_HEADER: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const TENANT_SCOPE_HEADER: HeaderName = HeaderName::from_static("x-store-id");

const KEEP_ALIVE_HEADER: HeaderName = HeaderName::from_static("keep-alive");
const PROXY_CONNECTION_HEADER: HeaderName = HeaderName::from_static("proxy-connection");

/// The store a backend call should be scoped to, if any.
///
/// Only a master host may impersonate a tenant, and only with a selector
/// that parses as a UUID right now.
pub fn tenant_scope(
    host: &str,
    credentials: &SessionCredentials,
    master_hosts: &MasterHosts,
) -> Option<StoreId> {
    if !credentials.has_support_cookie() {
        return None;
    }

    if !master_hosts.is_master_host(host) {
        tracing::debug!(host = %host, "Ignoring support selector on non-master host");
        return None;
    }

    let scope = credentials.support_selector();
    if scope.is_none() {
        tracing::warn!(host = %host, "Ignoring malformed support selector cookie");
    }
    scope
}

/// Copy browser headers for pass-through, minus the ones that describe the
/// browser's own connection to the gateway.
///
/// Cookies and any browser-sent `authorization` never reach the backend; the
/// bearer token is set from the access cookie by [`apply_trust_headers`].
pub fn forwardable_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = incoming.clone();

    // Hop-by-hop: anything `connection` names, then the fixed set. The body
    // is re-sent buffered with its own length.
    let named: Vec<HeaderName> = incoming
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();
    for name in named {
        headers.remove(name);
    }
    for name in [CONNECTION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE, PROXY_AUTHORIZATION] {
        headers.remove(name);
    }
    headers.remove(KEEP_ALIVE_HEADER);
    headers.remove(PROXY_CONNECTION_HEADER);

    headers.remove(HOST);
    headers.remove(CONTENT_LENGTH);
    headers.remove(COOKIE);
    headers.remove(AUTHORIZATION);
    // The body is read back as text; ask for it uncompressed
    headers.remove(ACCEPT_ENCODING);
    headers
}

/// Set the trust headers on an outbound header map
pub fn apply_trust_headers(
    headers: &mut HeaderMap,
    host: &str,
    access_token: Option<&str>,
    scope: Option<StoreId>,
) {
    headers.remove(FORWARDED_HOST_HEADER);
    headers.remove(TENANT_SCOPE_HEADER);

    match HeaderValue::from_str(host) {
        Ok(value) => {
            headers.insert(FORWARDED_HOST_HEADER, value);
        }
        Err(_) => tracing::warn!("Host is not a valid header value; omitting x-forwarded-host"),
    }

    if let Some(token) = access_token {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Access credential is not a valid header value"),
        }
    }

    if let Some(store) = scope {
        // A UUID always renders as a valid header value
        if let Ok(value) = HeaderValue::from_str(&store.to_string()) {
            headers.insert(TENANT_SCOPE_HEADER, value);
        }
    }
}

/// Trust headers for a gateway-originated call (no browser headers copied)
pub fn trusted_headers(
    host: &str,
    credentials: &SessionCredentials,
    master_hosts: &MasterHosts,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    apply_trust_headers(
        &mut headers,
        host,
        credentials.access_token(),
        tenant_scope(host, credentials, master_hosts),
    );
    headers
}
