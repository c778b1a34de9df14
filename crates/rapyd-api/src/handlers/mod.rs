//! Route handlers.

pub mod download;
pub mod files;
pub mod health;
pub mod thumb;

use crate::error::ApiError;
use rapyd_core::error::AppError;

/// Fallback for unknown `/api/*` routes.
pub async fn api_not_found() -> ApiError {
    AppError::not_found("Unknown API endpoint").into()
}
