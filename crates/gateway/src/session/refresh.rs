//! Access credential refresh

use crate::backend::BackendClient;
use crate::trust::apply_trust_headers;

use super::SessionCredentials;

/// Spend the refresh credential once to mint a new access credential.
///
/// Returns `None` when there is no refresh credential, the call fails, or the
/// backend answers without a token. Never clears or rotates the refresh
/// credential itself.
pub async fn refresh_access_token(
    backend: &BackendClient,
    host: &str,
    credentials: &SessionCredentials,
) -> Option<String> {
    let refresh_token = credentials.refresh_token()?;

    let mut headers = axum::http::HeaderMap::new();
    apply_trust_headers(&mut headers, host, None, None);

    tracing::info!(host = %host, "Refreshing access credential");
    match backend.refresh(headers, refresh_token).await {
        Ok(reply) => {
            let token = reply.access_token.filter(|t| !t.is_empty());
            if token.is_none() {
                tracing::warn!(host = %host, "Refresh succeeded without an access credential");
            }
            token
        }
        Err(e) => {
            tracing::warn!(host = %host, error = %e, "Access credential refresh failed");
            None
        }
    }
}
