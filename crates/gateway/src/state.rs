//! Shared application state

use std::sync::Arc;

use crate::backend::{BackendClient, BackendResult};
use crate::config::GatewayConfig;
use crate::proxy::ForwardingProxy;

/// Immutable per-process state. Nothing here changes after startup; all
/// session and tenant state is derived per request.
#[derive(Clone)]
pub struct AppState {
    config: Arc<GatewayConfig>,
    backend: BackendClient,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> BackendResult<Self> {
        let backend = BackendClient::new(&config.backend_url)?;
        Ok(Self {
            config: Arc::new(config),
            backend,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn proxy(&self) -> ForwardingProxy<'_> {
        ForwardingProxy::new(&self.backend, &self.config.master_hosts)
    }
}
