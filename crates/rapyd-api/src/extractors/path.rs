//! The `path` query parameter shared by all file routes.

use serde::Deserialize;

use rapyd_core::error::AppError;

/// `?path=...`, relative to the shared root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathQuery {
    /// Root-relative path, `/` or `\` separated.
    #[serde(default)]
    pub path: Option<String>,
}

impl PathQuery {
    /// The path, defaulting to the root.
    pub fn or_root(&self) -> &str {
        self.path.as_deref().unwrap_or("")
    }

    /// The path, failing with `Validation` when the parameter is absent.
    pub fn required(&self) -> Result<&str, AppError> {
        self.path
            .as_deref()
            .ok_or_else(|| AppError::validation("Missing path parameter"))
    }
}
