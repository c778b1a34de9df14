//! Cache directory housekeeping.

use std::path::Path;

use tokio::fs;
use tracing::{debug, info, warn};

use rapyd_core::error::{AppError, ErrorKind};
use rapyd_core::result::AppResult;

/// Name of the archive scratch directory inside the cache directory.
pub const ARCHIVE_DIR_NAME: &str = "archives";

/// Purge and recreate the cache directory. Run once at process start.
///
/// Only files this process family creates are removed: cached `*.jpg`
/// thumbnails, leftover `*.tmp` files and the archive scratch directory.
/// Anything else a user put there is left alone.
pub async fn prepare_cache_dir(cache_dir: &Path) -> AppResult<()> {
    fs::create_dir_all(cache_dir).await.map_err(|e| {
        AppError::with_source(ErrorKind::Storage, "Failed to create cache directory", e)
    })?;

    let mut removed = 0usize;
    let mut reader = fs::read_dir(cache_dir).await.map_err(|e| {
        AppError::with_source(ErrorKind::Storage, "Failed to read cache directory", e)
    })?;
    while let Some(entry) = reader.next_entry().await.map_err(|e| {
        AppError::with_source(ErrorKind::Storage, "Failed to read cache directory", e)
    })? {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        let Ok(file_type) = entry.file_type().await else {
            continue;
        };

        let outcome = if file_type.is_dir() && name == ARCHIVE_DIR_NAME {
            fs::remove_dir_all(&path).await
        } else if file_type.is_file() && (name.ends_with(".jpg") || name.ends_with(".tmp")) {
            fs::remove_file(&path).await
        } else {
            continue;
        };

        match outcome {
            Ok(()) => removed += 1,
            Err(e) => warn!(entry = %path.display(), error = %e, "Failed to purge cache entry"),
        }
    }

    fs::create_dir_all(cache_dir.join(ARCHIVE_DIR_NAME))
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create archive directory", e)
        })?;

    if removed > 0 {
        info!(cache_dir = %cache_dir.display(), removed, "Purged thumbnail cache");
    } else {
        debug!(cache_dir = %cache_dir.display(), "Thumbnail cache ready");
    }
    Ok(())
}
