//! Directory listing.

use std::time::UNIX_EPOCH;

use tokio::fs;
use tracing::{debug, warn};

use rapyd_core::error::{AppError, ErrorKind};
use rapyd_core::result::AppResult;
use rapyd_core::types::{DirectoryEntry, EntryCategory};

use crate::mime::mime_from_path;
use crate::resolver::ResolvedPath;

/// List the immediate children of a resolved directory.
///
/// Symlinks are followed; entries whose metadata cannot be read (broken
/// links, races with deletion) are skipped. Directories come first, then
/// files, each group ordered by case-insensitive name.
pub async fn list_directory(dir: &ResolvedPath) -> AppResult<Vec<DirectoryEntry>> {
    let meta = fs::metadata(&dir.absolute).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => {
            AppError::with_source(ErrorKind::Forbidden, "Directory is not readable", e)
        }
        _ => AppError::with_source(ErrorKind::NotFound, "Directory not found", e),
    })?;
    if !meta.is_dir() {
        return Err(AppError::validation("Path is not a directory"));
    }

    let mut reader = fs::read_dir(&dir.absolute).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => {
            AppError::with_source(ErrorKind::Forbidden, "Directory is not readable", e)
        }
        std::io::ErrorKind::NotFound => {
            AppError::with_source(ErrorKind::NotFound, "Directory not found", e)
        }
        _ => AppError::with_source(ErrorKind::Storage, "Failed to read directory", e),
    })?;

    let mut entries = Vec::new();
    loop {
        let entry = match reader.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.absolute.display(), error = %e, "Directory read interrupted");
                break;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) => {
                debug!(entry = %path.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let is_dir = meta.is_dir();
        let mime = if is_dir { None } else { mime_from_path(&path) };
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let rel = if dir.relative.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", dir.relative, name)
        };

        entries.push(DirectoryEntry {
            category: EntryCategory::classify(is_dir, mime.as_deref()),
            name,
            path: rel,
            is_dir,
            size: if is_dir { 0 } else { meta.len() },
            mtime,
            mime,
        });
    }

    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    Ok(entries)
}
