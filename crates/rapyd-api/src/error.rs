//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use rapyd_auth::challenge_header;
use rapyd_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// An `AppError` on its way to becoming an HTTP response.
///
/// Handlers return [`ApiResult`] and use `?` on any `AppResult`.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    challenge: Option<String>,
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// An authentication failure that asks the client for Basic credentials.
    pub fn challenge(error: AppError, realm: &str) -> Self {
        Self {
            error,
            challenge: Some(challenge_header(realm)),
        }
    }

    /// The wrapped error.
    pub fn inner(&self) -> &AppError {
        &self.error
    }

    /// HTTP status for an error kind.
    pub fn status_for(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Bind
            | ErrorKind::Configuration
            | ErrorKind::Storage
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            challenge: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = Self::status_for(self.error.kind);

        let (code, message) = if status.is_server_error() {
            tracing::error!(
                kind = %self.error.kind,
                error = %self.error.message,
                source = ?self.error.source,
                "Internal server error"
            );
            ("INTERNAL_ERROR".to_string(), "Internal server error".to_string())
        } else {
            (self.error.kind.to_string(), self.error.message)
        };

        let mut response = (status, Json(ApiErrorResponse { error: code, message })).into_response();

        if let Some(value) = self
            .challenge
            .and_then(|c| HeaderValue::from_str(&c).ok())
        {
            response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
        }

        response
    }
}
