//! Backend HTTP client

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use lotline_shared::{BackendContext, RefreshRequest, RefreshedToken, SessionIdentity};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

/// Context-by-host lookup
const CONTEXT_PATH: &str = "tenancy/context";
/// Login (issues access + refresh credentials)
const LOGIN_PATH: &str = "auth/login";
/// Refresh (reissues the access credential only)
const REFRESH_PATH: &str = "auth/refresh";
/// Identity lookup
const WHOAMI_PATH: &str = "auth/me";

/// Error type for backend calls
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {0}")]
    Status(StatusCode),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Undecoded backend reply
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Client for the backend API
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the given base URL.
    ///
    /// No request timeout is configured; a slow backend only holds up the
    /// request that is waiting on it.
    pub fn new(backend_url: &Url) -> BackendResult<Self> {
        let http = Client::builder().pool_max_idle_per_host(32).build()?;

        Ok(Self {
            http,
            base_url: backend_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// `{backend}/{path}{?query}`
    pub fn endpoint(&self, path: &str, query: Option<&str>) -> String {
        let path = path.trim_start_matches('/');
        match query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{}/{}?{}", self.base_url, path, query),
            None => format!("{}/{}", self.base_url, path),
        }
    }

    /// Send an arbitrary request and return the undecoded reply
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: HeaderMap,
        body: Bytes,
    ) -> BackendResult<RawResponse> {
        let mut request = self
            .http
            .request(method, self.endpoint(path, query))
            .headers(headers);
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }

    /// Look up the tenant context for the host in `x-forwarded-host`
    pub async fn context_by_host(&self, headers: HeaderMap) -> BackendResult<BackendContext> {
        let response = self
            .send(Method::GET, CONTEXT_PATH, None, headers, Bytes::new())
            .await?;
        decode_success(response)
    }

    /// Exchange login credentials for a token pair.
    ///
    /// The reply is returned undecoded so failures can be passed through.
    pub async fn login(&self, headers: HeaderMap, body: Bytes) -> BackendResult<RawResponse> {
        self.send(Method::POST, LOGIN_PATH, None, headers, body).await
    }

    /// Mint a new access credential from a refresh credential
    pub async fn refresh(
        &self,
        headers: HeaderMap,
        refresh_token: &str,
    ) -> BackendResult<RefreshedToken> {
        let body = serde_json::to_vec(&RefreshRequest { refresh_token })?;
        let mut headers = headers;
        headers.insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/json"),
        );

        let response = self
            .send(Method::POST, REFRESH_PATH, None, headers, Bytes::from(body))
            .await?;
        decode_success(response)
    }

    /// Ask the backend who the bearer of the access credential is
    pub async fn whoami(&self, headers: HeaderMap) -> BackendResult<SessionIdentity> {
        let response = self
            .send(Method::GET, WHOAMI_PATH, None, headers, Bytes::new())
            .await?;
        decode_success(response)
    }
}

fn decode_success<T: DeserializeOwned>(response: RawResponse) -> BackendResult<T> {
    if !response.status.is_success() {
        return Err(BackendError::Status(response.status));
    }
    Ok(serde_json::from_str(&response.body)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&base.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let backend = client("http://backend.internal:4000/v1/");
        assert_eq!(
            backend.endpoint("/vehicles", None),
            "http://backend.internal:4000/v1/vehicles"
        );
        assert_eq!(
            backend.endpoint("vehicles/42", Some("include=photos")),
            "http://backend.internal:4000/v1/vehicles/42?include=photos"
        );
        assert_eq!(
            backend.endpoint("leads", Some("")),
            "http://backend.internal:4000/v1/leads"
        );
    }

    #[test]
    fn test_endpoint_on_bare_origin() {
        // Url normalizes a bare origin to a trailing slash
        let backend = client("http://backend.internal");
        assert_eq!(backend.endpoint("auth/me", None), "http://backend.internal/auth/me");
    }

    #[test]
    fn test_decode_success_rejects_non_2xx() {
        let result: BackendResult<RefreshedToken> = decode_success(RawResponse {
            status: StatusCode::UNAUTHORIZED,
            body: "{}".into(),
        });
        assert!(matches!(result, Err(BackendError::Status(StatusCode::UNAUTHORIZED))));
    }

    #[test]
    fn test_decode_success_rejects_bad_json() {
        let result: BackendResult<RefreshedToken> = decode_success(RawResponse {
            status: StatusCode::OK,
            body: "<html>".into(),
        });
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }
}
