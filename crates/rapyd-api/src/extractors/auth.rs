//! `AuthUser` extractor: runs the Basic auth gate before a handler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use rapyd_auth::Identity;

use crate::error::ApiError;
use crate::state::AppState;

/// Identity of the caller, available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl std::ops::Deref for AuthUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .auth
            .authenticate(&parts.headers)
            .map(AuthUser)
            .map_err(|e| ApiError::challenge(e, state.auth.realm()))
    }
}
