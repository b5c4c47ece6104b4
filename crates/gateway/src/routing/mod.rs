//! Host-based tenant routing
//!
//! Maps the incoming Host header to a tenant decision:
//! - [`classify`] / [`MasterHosts`]: local, synchronous master fast path
//! - [`resolve_tenant_context`]: authoritative lookup against the backend
//! - [`canonical_path`]: the path form every prefix check runs against

mod context;
mod host;
mod path;

pub use context::resolve_tenant_context;
pub use host::{classify, ClientHost, MasterHosts};
pub use path::{canonical_path, encode_path, is_canonical};
