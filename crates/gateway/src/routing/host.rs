//! Host classification
//!
//! Every layer that looks at the Host header (edge gate, forwarding proxy,
//! session routes) normalizes it through [`classify`] so they agree on what
//! host a request belongs to.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::HOST, request::Parts},
};
use std::convert::Infallible;

/// Normalize a raw Host header value.
///
/// Strips a trailing `:port`, trims, and lowercases. Idempotent.
pub fn classify(raw: &str) -> String {
    let host = raw.trim();
    let host = match host.rsplit_once(':') {
        // A bare IPv6 literal has colons but no port; only `[v6]:port` is split
        Some((name, port))
            if !port.is_empty()
                && port.chars().all(|c| c.is_ascii_digit())
                && (!name.contains(':') || name.ends_with(']')) =>
        {
            name
        }
        _ => host,
    };
    host.trim().to_lowercase()
}

/// Allow-list of administrative (master) domains
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterHosts {
    hosts: Vec<String>,
}

impl MasterHosts {
    /// Build the allow-list, normalizing every entry with [`classify`]
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hosts: Vec<String> = hosts
            .into_iter()
            .map(|h| classify(h.as_ref()))
            .filter(|h| !h.is_empty())
            .collect();
        hosts.sort();
        hosts.dedup();
        Self { hosts }
    }

    /// Parse a comma-separated list (as found in `MASTER_HOSTS`)
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Exact match after normalization. No network call.
    pub fn is_master_host(&self, host: &str) -> bool {
        let host = classify(host);
        !host.is_empty() && self.hosts.iter().any(|h| *h == host)
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }
}

/// The normalized host of the current request.
///
/// Read from the `Host` header, falling back to the URI authority. Empty when
/// neither is present, which every resolver treats as an unknown host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHost(pub String);

impl ClientHost {
    pub fn from_parts(parts: &Parts) -> Self {
        let raw = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| parts.uri.host())
            .unwrap_or_default();
        Self(classify(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientHost
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("Example.COM"), "example.com");
        assert_eq!(classify("Example.com:8080"), "example.com");
        assert_eq!(classify("EXAMPLE.COM:443"), "example.com");
        assert_eq!(classify("  shop.example.com  "), "shop.example.com");
        assert_eq!(classify(""), "");
    }

    #[test]
    fn test_classify_is_idempotent() {
        for raw in ["Example.com:8080", "ADMIN.lotline.io", " a.b.c:1 ", "localhost:3000", "[::1]:8080"] {
            let once = classify(raw);
            assert_eq!(classify(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_classify_keeps_non_numeric_suffix() {
        assert_eq!(classify("example.com:"), "example.com:");
        assert_eq!(classify("[::1]:8080"), "[::1]");
        assert_eq!(classify("::1"), "::1");
    }

    #[test]
    fn test_is_master_host() {
        let masters = MasterHosts::parse_list("Admin.Lotline.io, admin.localhost:3000,");
        assert!(masters.is_master_host("admin.lotline.io"));
        assert!(masters.is_master_host("ADMIN.LOTLINE.IO:443"));
        assert!(masters.is_master_host("admin.localhost"));
        assert!(!masters.is_master_host("shop.lotline.io"));
        assert!(!masters.is_master_host("lotline.io"));
        assert!(!masters.is_master_host("evil-admin.lotline.io"));
        assert!(!masters.is_master_host(""));
    }

    #[test]
    fn test_empty_entries_are_dropped() {
        let masters = MasterHosts::parse_list(" , ,");
        assert!(masters.is_empty());
        assert!(!masters.is_master_host(""));
    }
}
