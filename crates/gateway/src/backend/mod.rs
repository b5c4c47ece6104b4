//! Backend API client
//!
//! Thin reqwest wrapper over the endpoints the gateway consumes. Callers
//! build the trust headers; this layer only moves bytes and decodes JSON.

mod client;

pub use client::{BackendClient, BackendError, BackendResult, RawResponse};
