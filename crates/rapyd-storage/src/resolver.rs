//! Containment-checked resolution of request paths.
//!
//! Every request carrying a `path` parameter goes through
//! [`PathResolver::resolve`] before the filesystem is touched. It is the only
//! thing standing between a query string and directory traversal.

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::warn;

use rapyd_core::error::{AppError, ErrorKind};
use rapyd_core::result::AppResult;

/// A request path after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Absolute path inside the root. Canonical when the target exists.
    pub absolute: PathBuf,
    /// Normalized root-relative form, forward-slash separated, empty for the root.
    pub relative: String,
}

impl ResolvedPath {
    /// Whether this is the shared root itself.
    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }
}

/// Resolves user-supplied relative paths against a canonical root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Canonicalized shared root.
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for the given root directory.
    pub fn new(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = std::fs::canonicalize(root.as_ref()).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Shared root does not exist", e)
        })?;
        if !root.is_dir() {
            return Err(AppError::configuration("Shared root is not a directory"));
        }
        Ok(Self { root })
    }

    /// The canonical root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `relative` inside the root.
    ///
    /// `/` and `\` are both separators on every platform. A `..` that would
    /// climb above the root, an absolute component, or a symlink whose target
    /// lies outside the root fails with `Forbidden`. A path that does not
    /// exist resolves to its lexical form so that callers can answer
    /// `NotFound`; one that exists but cannot be resolved (a symlink loop)
    /// fails with `NotFound` directly.
    pub async fn resolve(&self, relative: &str) -> AppResult<ResolvedPath> {
        let segments = normalize_segments(relative)?;

        let mut joined = self.root.clone();
        for segment in &segments {
            joined.push(segment);
        }
        let relative = segments.join("/");

        match fs::canonicalize(&joined).await {
            Ok(canonical) => {
                if canonical.starts_with(&self.root) {
                    Ok(ResolvedPath {
                        absolute: canonical,
                        relative,
                    })
                } else {
                    warn!(requested = %relative, "Rejected path resolving outside the shared root");
                    Err(AppError::forbidden("Access denied"))
                }
            }
            Err(e) => match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory => {
                    Ok(ResolvedPath {
                        absolute: joined,
                        relative,
                    })
                }
                std::io::ErrorKind::PermissionDenied => Err(AppError::with_source(
                    ErrorKind::Forbidden,
                    "Access denied",
                    e,
                )),
                // Symlink loops and other unresolvable entries.
                _ => {
                    warn!(requested = %relative, error = %e, "Path could not be resolved");
                    Err(AppError::with_source(ErrorKind::NotFound, "Path not found", e))
                }
            },
        }
    }
}

/// Split a request path into plain segments, applying `.` and `..` lexically.
fn normalize_segments(relative: &str) -> AppResult<Vec<&str>> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(AppError::forbidden("Access denied"));
                }
            }
            s => {
                if s.contains('\0') {
                    return Err(AppError::forbidden("Access denied"));
                }
                // Drive prefixes like `C:` on Windows.
                let plain = Path::new(s)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
                if !plain {
                    return Err(AppError::forbidden("Access denied"));
                }
                segments.push(s);
            }
        }
    }

    Ok(segments)
}
