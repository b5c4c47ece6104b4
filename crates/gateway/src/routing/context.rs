//! Tenant context resolution
//!
//! The backend is the only authority on whether a host is the master domain,
//! a tenant domain, or unknown. Every failure collapses to `unknown`, which
//! callers treat as deny.

use lotline_shared::TenantContext;

use crate::backend::BackendClient;
use crate::trust::apply_trust_headers;

/// Resolve the tenant context for a normalized host. Never fails.
pub async fn resolve_tenant_context(backend: &BackendClient, host: &str) -> TenantContext {
    if host.is_empty() {
        return TenantContext::unknown(host);
    }

    // Context lookup is anonymous; no credential or store scope is sent
    let mut headers = axum::http::HeaderMap::new();
    apply_trust_headers(&mut headers, host, None, None);

    match backend.context_by_host(headers).await {
        Ok(reply) => {
            let context = reply.into_context(host);
            if context.is_unknown() {
                tracing::info!(host = %host, "Host is not registered with any store");
            }
            context
        }
        Err(e) => {
            tracing::warn!(host = %host, error = %e, "Tenant context lookup failed; treating host as unknown");
            TenantContext::unknown(host)
        }
    }
}
