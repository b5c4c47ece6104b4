//! Lotline Shared Types
//!
//! Tenant and session types exchanged between the edge gateway, the backend
//! API, and the page renderer.

pub mod types;

pub use types::*;
