//! HTTP API for symptom triage.
//!
//! `triage_api_router()` returns a composable `Router`; `server` binds
//! and runs it with graceful shutdown.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::triage_api_router;
pub use server::{start_api_server_on, ApiServer};
pub use types::ApiContext;
