//! Lotline Edge Gateway
//!
//! Sits between the browser and the backend API. For every request it works
//! out which store the host belongs to, gates pages on authentication and
//! tenant scope, relays API calls with trusted headers, and refreshes
//! expired access credentials in flight.

pub mod backend;
pub mod config;
pub mod error;
pub mod gate;
pub mod proxy;
pub mod routes;
pub mod routing;
pub mod security;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod trust;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use routes::create_router;
pub use routing::{classify, MasterHosts};
pub use state::AppState;
