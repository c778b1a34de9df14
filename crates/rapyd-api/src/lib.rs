//! # rapyd-api
//!
//! HTTP layer for RapydShare built on Axum: the file routes, their
//! extractors and middleware, the error mapping, and the lifecycle that
//! binds and stops the listener.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod spa;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use server::ServerLifecycle;
pub use state::AppState;
