//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file and `RAPYD__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section. A loaded
//! [`AppConfig`] is the immutable configuration of one running server
//! instance; the launcher builds a fresh one before every start.

pub mod app;
pub mod auth;
pub mod logging;
pub mod share;
pub mod thumbnail;
pub mod worker;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::logging::LoggingConfig;
pub use self::share::ShareConfig;
pub use self::thumbnail::ThumbnailConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Shared directory settings.
    #[serde(default)]
    pub share: ShareConfig,
    /// Basic authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Thumbnail cache settings.
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
    /// Worker pool settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file and the environment.
    ///
    /// Environment variables use the `RAPYD` prefix and `__` as the section
    /// separator, e.g. `RAPYD__SERVER__PORT=9000`.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("RAPYD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Check invariants and canonicalize the shared root.
    ///
    /// Must succeed before the configuration is handed to a server instance.
    pub fn validate(&mut self) -> Result<(), AppError> {
        if self.server.port == 0 {
            return Err(AppError::validation(
                "Malformed port: must be between 1 and 65535",
            ));
        }

        let root = std::fs::canonicalize(&self.share.root_dir)
            .map_err(|_| AppError::validation("Shared directory does not exist"))?;
        if !root.is_dir() {
            return Err(AppError::validation("Shared path is not a directory"));
        }
        self.share.root_dir = root;

        if self.worker.concurrency == 0 {
            return Err(AppError::validation(
                "Worker concurrency must be at least 1",
            ));
        }
        if self.thumbnail.max_dimension == 0 {
            return Err(AppError::validation(
                "Thumbnail max dimension must be at least 1",
            ));
        }
        if !(1..=100).contains(&self.thumbnail.jpeg_quality) {
            return Err(AppError::validation(
                "Thumbnail JPEG quality must be between 1 and 100",
            ));
        }
        if self.auth.enabled && self.auth.username.is_empty() {
            return Err(AppError::validation(
                "Username must not be empty when authentication is enabled",
            ));
        }

        Ok(())
    }
}
