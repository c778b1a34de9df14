//! Request authentication against the configured credential pair.

use http::HeaderMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use rapyd_core::config::AuthConfig;
use rapyd_core::error::AppError;
use rapyd_core::result::AppResult;

use crate::basic::{AuthError, BasicCredentials, extract_basic_credentials};

/// Who a request was accepted as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Authenticated username, or `guest` when authentication is disabled.
    pub username: String,
    /// Whether the request was let through without credentials.
    pub guest: bool,
}

impl Identity {
    /// The identity used when authentication is disabled.
    pub fn guest() -> Self {
        Self {
            username: "guest".to_string(),
            guest: true,
        }
    }
}

/// Checks Basic credentials against a single configured user.
///
/// Only SHA-256 digests of the expected credentials are kept. Both the
/// username and the password digest are always compared in full, so the
/// time taken does not reveal which part was wrong or how much of it matched.
#[derive(Clone)]
pub struct AuthGate {
    enabled: bool,
    username_digest: [u8; 32],
    password_digest: [u8; 32],
    realm: String,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("enabled", &self.enabled)
            .field("realm", &self.realm)
            .finish_non_exhaustive()
    }
}

impl AuthGate {
    /// Build a gate from the auth settings.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            enabled: config.enabled,
            username_digest: digest(&config.username),
            password_digest: digest(&config.password),
            realm: config.realm.clone(),
        }
    }

    /// A gate that lets every request through as guest.
    pub fn disabled() -> Self {
        Self::new(&AuthConfig::default())
    }

    /// Whether credentials are required.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Realm advertised in the challenge.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Authenticate a request from its headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<Identity> {
        if !self.enabled {
            return Ok(Identity::guest());
        }

        let credentials = extract_basic_credentials(headers).map_err(|e| {
            debug!(reason = %e, "Rejected request without usable credentials");
            AppError::from(e)
        })?;

        if self.verify(&credentials) {
            Ok(Identity {
                username: credentials.username,
                guest: false,
            })
        } else {
            warn!(username = %credentials.username, "Failed authentication attempt");
            Err(AuthError::AuthenticationFailed.into())
        }
    }

    /// Compare supplied credentials with the configured pair.
    pub fn verify(&self, credentials: &BasicCredentials) -> bool {
        let user_ok = digests_equal(&digest(&credentials.username), &self.username_digest);
        let pass_ok = digests_equal(&digest(&credentials.password), &self.password_digest);
        user_ok & pass_ok
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

fn digests_equal(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
