//! Shared directory configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What is exposed over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Root directory exposed for browsing. Canonicalized by `validate()`.
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    /// Directory holding the pre-built browsing front-end.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: PathBuf,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            frontend_dir: default_frontend_dir(),
        }
    }
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from("frontend/dist")
}
