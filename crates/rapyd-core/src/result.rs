//! Convenience result type alias for RapydShare.

use crate::error::AppError;

/// A specialized `Result` type for RapydShare operations.
pub type AppResult<T> = Result<T, AppError>;
