//! HTTP API for the five-step evaluation workflow.
//!
//! Every workflow route is scoped to a session created with
//! `POST /api/sessions`; sessions live in memory only.
//!
//! The router is composable: `build_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server_on, ApiServer, ServerError, ServerInfo};
pub use types::ApiContext;
