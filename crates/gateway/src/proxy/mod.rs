//! API Forwarding Proxy
//!
//! Every backend API call from the browser goes through here. The proxy
//! attaches trust headers, owns the refresh-and-retry protocol, and hands
//! back the backend's status with a JSON body.

mod forward;
mod handler;

pub use forward::{normalize_body, Attempt, ForwardRequest, ForwardingProxy, ProxyResponse};
pub use handler::{forward_handler, PROXY_PREFIX};
