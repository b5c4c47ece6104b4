//! Tenant context and session identity types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Store (tenant) ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub Uuid);

impl StoreId {
    /// Parse a store id from untrusted text (cookie, request body).
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl From<Uuid> for StoreId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Tenant Context
// =============================================================================

/// How a host relates to the tenant directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantMode {
    /// Administrative domain; no store unless support mode selects one
    Master,
    /// Domain bound to exactly one store
    Tenant,
    /// Not registered anywhere. Callers deny by default.
    Unknown,
}

/// Public summary of a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub id: StoreId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Per-request tenant decision for a host. Never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub mode: TenantMode,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreSummary>,
}

impl TenantContext {
    /// The deny-by-default context
    pub fn unknown(host: impl Into<String>) -> Self {
        Self {
            mode: TenantMode::Unknown,
            host: host.into(),
            store: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.mode == TenantMode::Unknown
    }

    pub fn is_master(&self) -> bool {
        self.mode == TenantMode::Master
    }
}

/// Body returned by the backend context-by-host lookup
#[derive(Debug, Clone, Deserialize)]
pub struct BackendContext {
    pub mode: TenantMode,
    #[serde(default)]
    pub store: Option<StoreSummary>,
}

impl BackendContext {
    /// Attach the host the lookup was made for.
    ///
    /// A `tenant` answer without a store cannot be acted on and collapses
    /// to `unknown`.
    pub fn into_context(self, host: &str) -> TenantContext {
        match (self.mode, self.store) {
            (TenantMode::Tenant, None) => TenantContext::unknown(host),
            (TenantMode::Unknown, _) => TenantContext::unknown(host),
            (mode, store) => TenantContext {
                mode,
                host: host.to_string(),
                store,
            },
        }
    }
}

// =============================================================================
// Session Identity
// =============================================================================

/// Who the caller is, as reported by the backend for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub is_super_admin: bool,
    #[serde(default)]
    pub roles: Vec<String>,
}

// =============================================================================
// Token Exchange
// =============================================================================

/// Credentials issued by the backend at login
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Refresh response body. Only the access credential is reissued.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
    #[serde(default)]
    pub access_token: Option<String>,
}
