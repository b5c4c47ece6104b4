//! Gateway configuration

use std::env;

use url::Url;

use crate::gate::GatePaths;
use crate::routing::MasterHosts;

/// Default forwarding-proxy body cap (10MB, enough for vehicle photo uploads)
const DEFAULT_MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Gateway configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    // Server
    pub bind_address: String,
    pub environment: Environment,

    // Backend
    pub backend_url: Url,
    pub max_request_body_bytes: usize,

    // Tenancy
    pub master_hosts: MasterHosts,

    // Cookies
    pub secure_cookies: bool,

    // Redirect targets and path classes used by the edge gate
    pub paths: GatePaths,
}

impl GatewayConfig {
    /// Config with defaults for everything except the backend
    pub fn new(backend_url: Url) -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            environment: Environment::Development,
            backend_url,
            max_request_body_bytes: DEFAULT_MAX_REQUEST_BODY_BYTES,
            master_hosts: MasterHosts::new(["admin.localhost"]),
            secure_cookies: false,
            paths: GatePaths::default(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url = env::var("BACKEND_URL").map_err(|_| ConfigError::Missing("BACKEND_URL"))?;
        let backend_url = parse_backend_url(&backend_url)?;

        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let mut config = Self::new(backend_url).with_environment(environment);

        if let Ok(addr) = env::var("BIND_ADDRESS") {
            config.bind_address = addr;
        }
        if let Ok(list) = env::var("MASTER_HOSTS") {
            config.master_hosts = MasterHosts::parse_list(&list);
        }
        if let Ok(v) = env::var("COOKIE_SECURE") {
            config.secure_cookies = v.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("COOKIE_SECURE must be 'true' or 'false', got {v:?}"))
            })?;
        }
        if let Ok(v) = env::var("MAX_REQUEST_BODY_BYTES") {
            config.max_request_body_bytes = v.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("MAX_REQUEST_BODY_BYTES must be a byte count, got {v:?}"))
            })?;
        }

        // Paths
        let paths = &mut config.paths;
        override_path("LOGIN_PATH", &mut paths.login);
        override_path("DOMAIN_NOT_FOUND_PATH", &mut paths.domain_not_found);
        override_path("STORE_SELECTION_PATH", &mut paths.store_selection);
        override_path("TENANT_LANDING_PATH", &mut paths.tenant_landing);
        override_path("ADMIN_PATH", &mut paths.admin);
        if let Ok(list) = env::var("STORE_SCOPED_PATHS") {
            paths.store_scoped = split_list(&list);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that `from_env` and the builder can both violate
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.master_hosts.is_empty() {
            return Err(ConfigError::Invalid(
                "MASTER_HOSTS must name at least one host".to_string(),
            ));
        }

        let p = &self.paths;
        let named = [
            ("LOGIN_PATH", &p.login),
            ("DOMAIN_NOT_FOUND_PATH", &p.domain_not_found),
            ("STORE_SELECTION_PATH", &p.store_selection),
            ("TENANT_LANDING_PATH", &p.tenant_landing),
            ("ADMIN_PATH", &p.admin),
        ];
        for (name, path) in named {
            if !path.starts_with('/') || path.len() < 2 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be an absolute path below '/', got {path:?}"
                )));
            }
        }
        for path in p.store_scoped.iter().chain(p.passthrough.iter()) {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "path list entries must start with '/', got {path:?}"
                )));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self.secure_cookies = environment == Environment::Production;
        self
    }

    #[must_use]
    pub fn with_master_hosts(mut self, hosts: MasterHosts) -> Self {
        self.master_hosts = hosts;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_paths(mut self, paths: GatePaths) -> Self {
        self.paths = paths;
        self
    }

    #[must_use]
    pub fn with_max_request_body_bytes(mut self, bytes: usize) -> Self {
        self.max_request_body_bytes = bytes;
        self
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw
        .trim()
        .parse()
        .map_err(|e| ConfigError::InvalidUrl(format!("BACKEND_URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(format!(
            "BACKEND_URL: unsupported scheme '{other}'"
        ))),
    }
}

fn override_path(var: &str, target: &mut String) {
    if let Ok(v) = env::var(var) {
        *target = v.trim().to_string();
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
