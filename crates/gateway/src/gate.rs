//! Edge Request Gate
//!
//! Runs before anything else on every request. The decision is a pure
//! function of (host, path, cookie presence) and never calls the backend;
//! [`edge_gate_middleware`] only feeds it and turns the answer into a
//! redirect.
//!
//! Paths are compared in canonical form (see [`canonical_path`]); a page
//! request whose raw path is not canonical is first redirected to the
//! canonical URL, so the renderer never sees a path the gate did not check.
//!
//! Decision order:
//! 0. a path that does not decode is rejected
//! 1. pass-through prefixes (`/api`, static assets) are untouched
//! 2. non-master host asking for the admin area -> tenant landing
//! 3. no access credential on a non-public page -> login
//! 4. master host on a store-scoped page without a valid store -> store selection
//! 5. allow

use axum::{
    extract::{Request, State},
    http::{header::LOCATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::error::GatewayError;
use crate::routing::{canonical_path, encode_path, ClientHost, MasterHosts};
use crate::session::SessionCredentials;
use crate::state::AppState;

/// Which session cookies are usable on this request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookiePresence {
    pub access: bool,
    pub valid_support_selector: bool,
}

/// Redirect targets and path classes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePaths {
    pub login: String,
    pub domain_not_found: String,
    pub store_selection: String,
    pub tenant_landing: String,
    /// Root of the administrative area
    pub admin: String,
    /// Pages that only make sense inside one store
    pub store_scoped: Vec<String>,
    /// Prefixes the gate never inspects
    pub passthrough: Vec<String>,
}

impl Default for GatePaths {
    fn default() -> Self {
        Self {
            login: "/login".into(),
            domain_not_found: "/domain-not-found".into(),
            store_selection: "/sa/select-store".into(),
            tenant_landing: "/dashboard".into(),
            admin: "/sa".into(),
            store_scoped: ["/dashboard", "/vehicles", "/leads", "/customers", "/sales", "/activities"]
                .into_iter()
                .map(String::from)
                .collect(),
            passthrough: ["/api", "/assets", "/static", "/favicon.ico", "/robots.txt"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl GatePaths {
    /// Pages reachable without an access credential
    pub fn is_public(&self, path: &str) -> bool {
        is_within(path, &self.login) || is_within(path, &self.domain_not_found)
    }

    pub fn is_passthrough(&self, path: &str) -> bool {
        self.passthrough.iter().any(|p| is_within(path, p))
    }

    pub fn is_admin(&self, path: &str) -> bool {
        is_within(path, &self.admin)
    }

    pub fn is_store_scoped(&self, path: &str) -> bool {
        self.store_scoped.iter().any(|p| is_within(path, p))
    }
}

/// `path` is `prefix` itself or a sub-path of it.
///
/// Matches on segment boundaries: `/sa/users` is within `/sa`, `/sales` is not.
pub fn is_within(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Outcome of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Not a page; the gate does not apply
    PassThrough,
    /// Path does not percent-decode to UTF-8
    RejectPath,
    Allow,
    RedirectTenantLanding,
    RedirectLogin,
    RedirectStoreSelection,
}

impl GateDecision {
    pub fn redirect_target<'a>(&self, paths: &'a GatePaths) -> Option<&'a str> {
        match self {
            GateDecision::PassThrough | GateDecision::RejectPath | GateDecision::Allow => None,
            GateDecision::RedirectTenantLanding => Some(&paths.tenant_landing),
            GateDecision::RedirectLogin => Some(&paths.login),
            GateDecision::RedirectStoreSelection => Some(&paths.store_selection),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateDecision::PassThrough => "pass_through",
            GateDecision::RejectPath => "reject_path",
            GateDecision::Allow => "allow",
            GateDecision::RedirectTenantLanding => "redirect_tenant_landing",
            GateDecision::RedirectLogin => "redirect_login",
            GateDecision::RedirectStoreSelection => "redirect_store_selection",
        }
    }
}

/// Decide what to do with a request. `path` may be raw; it is
/// canonicalized before any prefix check.
pub fn decide(
    paths: &GatePaths,
    master_hosts: &MasterHosts,
    host: &str,
    path: &str,
    cookies: CookiePresence,
) -> GateDecision {
    let Some(path) = canonical_path(path) else {
        return GateDecision::RejectPath;
    };
    let path = path.as_str();

    if paths.is_passthrough(path) {
        return GateDecision::PassThrough;
    }

    let is_master = master_hosts.is_master_host(host);

    if !is_master && paths.is_admin(path) {
        return GateDecision::RedirectTenantLanding;
    }

    if !cookies.access && !paths.is_public(path) {
        return GateDecision::RedirectLogin;
    }

    if is_master
        && paths.is_store_scoped(path)
        && !cookies.valid_support_selector
        && path != paths.store_selection
    {
        return GateDecision::RedirectStoreSelection;
    }

    GateDecision::Allow
}

/// Middleware applying [`decide`] to every inbound request
pub async fn edge_gate_middleware(
    State(state): State<AppState>,
    host: ClientHost,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let credentials = SessionCredentials::from_jar(&jar);
    let config = state.config();

    // API calls and assets keep their raw path (ids may carry %2F); anything
    // that only looks like one once decoded is gated as a page
    let canonical = canonical_path(&path);
    if paths_pass_through(&config.paths, &path, canonical.as_deref()) {
        return next.run(request).await;
    }

    if let Some(canonical) = &canonical {
        let wire = encode_path(canonical);
        if wire != path {
            tracing::debug!(host = %host.as_str(), path = %path, canonical = %wire, "Redirecting to canonical path");
            return canonical_redirect(&wire, request.uri().query());
        }
    }

    let decision = decide(
        &config.paths,
        &config.master_hosts,
        host.as_str(),
        &path,
        credentials.presence(),
    );

    if decision == GateDecision::RejectPath {
        tracing::warn!(host = %host.as_str(), path = %path, "Rejecting undecodable path");
        return GatewayError::BadRequest("malformed request path".into()).into_response();
    }

    match decision.redirect_target(&config.paths) {
        Some(target) => {
            tracing::debug!(
                host = %host.as_str(),
                path = %path,
                decision = decision.as_str(),
                "Edge gate redirect"
            );
            Redirect::temporary(target).into_response()
        }
        None => next.run(request).await,
    }
}

fn paths_pass_through(paths: &GatePaths, raw: &str, canonical: Option<&str>) -> bool {
    paths.is_passthrough(raw) && canonical.is_some_and(|c| paths.is_passthrough(c))
}

fn canonical_redirect(wire_path: &str, query: Option<&str>) -> Response {
    let target = match query {
        Some(q) => format!("{wire_path}?{q}"),
        None => wire_path.to_string(),
    };
    match HeaderValue::from_str(&target) {
        Ok(location) => (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, location)]).into_response(),
        Err(_) => GatewayError::BadRequest("malformed request path".into()).into_response(),
    }
}
