//! `Authorization: Basic` header parsing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::HeaderMap;

use rapyd_core::error::AppError;

/// Credentials decoded from a Basic auth header.
#[derive(Clone)]
pub struct BasicCredentials {
    /// Username
    pub username: String,
    /// Password (plaintext from header)
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Extract Basic credentials from HTTP headers.
///
/// The scheme name is matched case-insensitively. The password is
/// everything after the first `:` and may itself contain colons.
pub fn extract_basic_credentials(headers: &HeaderMap) -> Result<BasicCredentials, AuthError> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidHeader)?;

    let (scheme, encoded) = auth_str
        .trim()
        .split_once(' ')
        .ok_or(AuthError::NotBasicAuth)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthError::NotBasicAuth);
    }

    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_| AuthError::InvalidEncoding)?;

    let decoded_str = String::from_utf8(decoded).map_err(|_| AuthError::InvalidEncoding)?;

    let (username, password) = decoded_str
        .split_once(':')
        .ok_or(AuthError::InvalidFormat)?;

    Ok(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Value of the `WWW-Authenticate` header for a realm.
pub fn challenge_header(realm: &str) -> String {
    format!("Basic realm=\"{}\"", realm.replace(['"', '\\'], ""))
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header present
    #[error("Missing Authorization header")]
    MissingHeader,

    /// Authorization header is not valid UTF-8
    #[error("Invalid Authorization header")]
    InvalidHeader,

    /// Not a Basic auth scheme
    #[error("Not Basic authentication")]
    NotBasicAuth,

    /// Base64 decoding failed
    #[error("Invalid base64 encoding")]
    InvalidEncoding,

    /// Credentials format invalid (missing colon)
    #[error("Invalid credentials format")]
    InvalidFormat,

    /// Username or password did not match
    #[error("Authentication failed")]
    AuthenticationFailed,
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingHeader | AuthError::NotBasicAuth => {
                AppError::unauthorized("Authentication required")
            }
            AuthError::AuthenticationFailed => AppError::unauthorized("Invalid credentials"),
            _ => AppError::unauthorized("Invalid authentication"),
        }
    }
}
