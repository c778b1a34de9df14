//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Single shared credential pair for HTTP Basic authentication.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether credentials are required at all.
    #[serde(default)]
    pub enabled: bool,
    /// Expected username.
    #[serde(default = "default_username")]
    pub username: String,
    /// Expected password.
    #[serde(default = "default_password")]
    pub password: String,
    /// Realm sent in the `WWW-Authenticate` challenge.
    #[serde(default = "default_realm")]
    pub realm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            username: default_username(),
            password: default_password(),
            realm: default_realm(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("realm", &self.realm)
            .finish()
    }
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_realm() -> String {
    "RapydShare".to_string()
}
