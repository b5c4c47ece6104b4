//! Forwarding with at-most-one retry

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use futures::future::BoxFuture;
use serde_json::{json, Value};

use crate::backend::{BackendClient, BackendResult};
use crate::routing::MasterHosts;
use crate::session::{refresh_access_token, SessionCredentials};
use crate::trust::{apply_trust_headers, forwardable_headers, tenant_scope};

/// One inbound API call, captured once and replayable
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Backend path, without the proxy prefix
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    /// Raw body bytes (JSON or multipart), read exactly once
    pub body: Bytes,
    /// Normalized host of the browser request
    pub host: String,
}

/// Which attempt a forward is. A `Retry` never refreshes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    Retry,
}

/// Normalized backend reply
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Set when a refresh happened; the caller must store it as the new
    /// access cookie
    pub refreshed_access_token: Option<String>,
}

/// Parse the backend body as JSON, or wrap the text as `{ "raw": ... }`
pub fn normalize_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

pub struct ForwardingProxy<'a> {
    backend: &'a BackendClient,
    master_hosts: &'a MasterHosts,
}

impl<'a> ForwardingProxy<'a> {
    pub fn new(backend: &'a BackendClient, master_hosts: &'a MasterHosts) -> Self {
        Self {
            backend,
            master_hosts,
        }
    }

    /// Outbound headers for one attempt
    fn outbound_headers(&self, request: &ForwardRequest, credentials: &SessionCredentials) -> HeaderMap {
        let mut headers = forwardable_headers(&request.headers);
        apply_trust_headers(
            &mut headers,
            &request.host,
            credentials.access_token(),
            tenant_scope(&request.host, credentials, self.master_hosts),
        );
        headers
    }

    /// Forward a request to the backend.
    ///
    /// On a 401 from the `Initial` attempt with a refresh credential present,
    /// refreshes once and replays as `Retry`. A failed refresh returns the
    /// original 401 untouched. Transport errors are returned as `Err`.
    pub fn forward<'r>(
        &'r self,
        request: &'r ForwardRequest,
        credentials: &'r SessionCredentials,
        attempt: Attempt,
    ) -> BoxFuture<'r, BackendResult<ProxyResponse>>
    where
        'a: 'r,
    {
        Box::pin(async move {
            let headers = self.outbound_headers(request, credentials);
            let reply = self
                .backend
                .send(
                    request.method.clone(),
                    &request.path,
                    request.query.as_deref(),
                    headers,
                    request.body.clone(),
                )
                .await?;

            let original = ProxyResponse {
                status: reply.status,
                body: normalize_body(&reply.body),
                refreshed_access_token: None,
            };

            if reply.status != StatusCode::UNAUTHORIZED
                || attempt == Attempt::Retry
                || credentials.refresh_token().is_none()
            {
                return Ok(original);
            }

            let Some(token) = refresh_access_token(self.backend, &request.host, credentials).await else {
                return Ok(original);
            };

            let refreshed = credentials.with_access_token(token.clone());
            let mut retried = self.forward(request, &refreshed, Attempt::Retry).await?;
            tracing::info!(
                host = %request.host,
                path = %request.path,
                status = retried.status.as_u16(),
                "Replayed request after refresh"
            );
            retried.refreshed_access_token = Some(token);
            Ok(retried)
        })
    }
}
