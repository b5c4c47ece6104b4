//! Session identity resolution

use lotline_shared::SessionIdentity;

use crate::backend::BackendClient;
use crate::routing::MasterHosts;
use crate::trust::trusted_headers;

use super::SessionCredentials;

/// Ask the backend who the caller is.
///
/// `None` means "not authenticated" whether the session is absent, rejected,
/// or the backend could not be reached. Nothing is cached.
pub async fn resolve_identity(
    backend: &BackendClient,
    master_hosts: &MasterHosts,
    host: &str,
    credentials: &SessionCredentials,
) -> Option<SessionIdentity> {
    credentials.access_token()?;

    let headers = trusted_headers(host, credentials, master_hosts);
    match backend.whoami(headers).await {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::debug!(host = %host, error = %e, "Identity lookup failed");
            None
        }
    }
}
