//! Session credentials and identity
//!
//! The browser's security state lives in three cookies (see [`cookies`]).
//! They are read once per request into [`SessionCredentials`] and passed
//! explicitly to every resolver that needs them.

pub mod cookies;
mod identity;
mod refresh;

use axum_extra::extract::CookieJar;
use lotline_shared::StoreId;

use crate::gate::CookiePresence;

pub use identity::resolve_identity;
pub use refresh::refresh_access_token;

/// Credentials carried by the current request
#[derive(Clone, Default)]
pub struct SessionCredentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
    support_selector: Option<String>,
}

impl SessionCredentials {
    pub fn new(
        access_token: Option<String>,
        refresh_token: Option<String>,
        support_selector: Option<String>,
    ) -> Self {
        Self {
            access_token: access_token.filter(|v| !v.is_empty()),
            refresh_token: refresh_token.filter(|v| !v.is_empty()),
            support_selector: support_selector.filter(|v| !v.is_empty()),
        }
    }

    pub fn from_jar(jar: &CookieJar) -> Self {
        let value = |name: &str| jar.get(name).map(|c| c.value().to_string());
        Self::new(
            value(cookies::ACCESS_COOKIE_NAME),
            value(cookies::REFRESH_COOKIE_NAME),
            value(cookies::SUPPORT_COOKIE_NAME),
        )
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// The support-mode store, if the cookie holds a valid UUID.
    ///
    /// The cookie is browser-writable, so this re-validates on every call.
    /// Whether the selector may be *used* also depends on the host; see
    /// [`crate::trust::tenant_scope`].
    pub fn support_selector(&self) -> Option<StoreId> {
        self.support_selector.as_deref().and_then(StoreId::parse)
    }

    /// True when a selector cookie exists, valid or not
    pub fn has_support_cookie(&self) -> bool {
        self.support_selector.is_some()
    }

    /// Same credentials with a freshly minted access token
    pub fn with_access_token(&self, token: String) -> Self {
        Self {
            access_token: Some(token).filter(|v| !v.is_empty()),
            ..self.clone()
        }
    }

    pub fn presence(&self) -> CookiePresence {
        CookiePresence {
            access: self.access_token.is_some(),
            valid_support_selector: self.support_selector().is_some(),
        }
    }
}

// Tokens never reach logs
impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("support_selector", &self.support_selector)
            .finish()
    }
}
