//! Content-addressed on-disk thumbnail cache.
//!
//! A thumbnail lives at `{cache_dir}/{sha256(canonical source path)}.jpg`.
//! Entries are never invalidated while the process runs; the directory is
//! purged at startup instead. Files appear atomically (temp file + rename),
//! so a reader sees either nothing or a complete JPEG.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use rapyd_core::error::{AppError, ErrorKind};
use rapyd_core::result::AppResult;
use rapyd_core::traits::ThumbnailRenderer;
use rapyd_core::types::EntryCategory;

use crate::mime::file_category;
use crate::pool::WorkerPool;

type Generation = Shared<BoxFuture<'static, AppResult<()>>>;

/// A running generation. The id tells a finished task whether the map
/// entry is still its own.
#[derive(Clone)]
struct InFlight {
    id: Uuid,
    generation: Generation,
}

/// Cache key for a source path: lowercase hex SHA-256 of its string form.
pub fn cache_key(source: &Path) -> String {
    format!("{:x}", Sha256::digest(source.to_string_lossy().as_bytes()))
}

/// Serves thumbnails from disk, generating missing ones on the worker pool.
///
/// Concurrent misses for the same source share one generation.
#[derive(Clone)]
pub struct ThumbnailCache {
    cache_dir: PathBuf,
    pool: WorkerPool,
    renderer: Arc<dyn ThumbnailRenderer>,
    in_flight: Arc<DashMap<String, InFlight>>,
}

impl fmt::Debug for ThumbnailCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThumbnailCache")
            .field("cache_dir", &self.cache_dir)
            .field("pool", &self.pool)
            .field("renderer", &self.renderer)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl ThumbnailCache {
    /// Create a cache rooted at `cache_dir`.
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        pool: WorkerPool,
        renderer: Arc<dyn ThumbnailRenderer>,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            pool,
            renderer,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// The cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where the thumbnail for `source` is (or would be) stored.
    pub fn cache_path(&self, source: &Path) -> PathBuf {
        self.cache_dir.join(format!("{}.jpg", cache_key(source)))
    }

    /// Return the JPEG thumbnail for `source`, rendering it on a miss.
    ///
    /// `source` must be a resolved, canonical path. Missing files, files
    /// without a preview category and render failures all yield `NotFound`.
    /// A generation that has started runs to completion even if the caller
    /// goes away, so the result is cached for the next request.
    pub async fn get_or_create(&self, source: &Path) -> AppResult<Bytes> {
        let key = cache_key(source);
        let target = self.cache_dir.join(format!("{key}.jpg"));

        if let Some(bytes) = read_cached(&target).await? {
            debug!(key = %key, "Thumbnail cache hit");
            return Ok(bytes);
        }

        match fs::metadata(source).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(AppError::not_found("File not found")),
        }
        let category = file_category(source);
        if !category.has_preview() {
            return Err(AppError::not_found("No preview available"));
        }

        let generation = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| {
                self.spawn_generation(key.clone(), source.to_path_buf(), category, target.clone())
            })
            .generation
            .clone();

        if let Err(e) = generation.await {
            debug!(key = %key, error = %e, "Thumbnail generation failed");
            return Err(AppError::not_found("Thumbnail not available"));
        }

        read_cached(&target)
            .await?
            .ok_or_else(|| AppError::not_found("Thumbnail not available"))
    }

    /// Start rendering in a detached task. The task removes its own map
    /// entry when it finishes, whether or not anyone is still waiting, so a
    /// failure is never handed to later requests.
    fn spawn_generation(
        &self,
        key: String,
        source: PathBuf,
        category: EntryCategory,
        target: PathBuf,
    ) -> InFlight {
        let id = Uuid::new_v4();
        let pool = self.pool.clone();
        let renderer = Arc::clone(&self.renderer);
        let cache_dir = self.cache_dir.clone();
        let in_flight = Arc::clone(&self.in_flight);

        let handle = tokio::spawn(async move {
            let outcome = pool
                .execute(move || async move {
                    let bytes = renderer.render(&source, category).await?;
                    write_atomic(&cache_dir, &target, &bytes).await?;
                    debug!(source = %source.display(), size = bytes.len(), "Generated thumbnail");
                    Ok(())
                })
                .await;
            in_flight.remove_if(&key, |_, current| current.id == id);
            outcome
        });

        let generation = async move {
            handle.await.map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e)
            })?
        }
        .boxed()
        .shared();

        InFlight { id, generation }
    }
}

async fn read_cached(target: &Path) -> AppResult<Option<Bytes>> {
    match fs::read(target).await {
        Ok(bytes) => Ok(Some(Bytes::from(bytes))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            "Failed to read thumbnail cache",
            e,
        )),
    }
}

/// Write `bytes` to a unique temp file next to `target`, then rename it into place.
async fn write_atomic(cache_dir: &Path, target: &Path, bytes: &[u8]) -> AppResult<()> {
    fs::create_dir_all(cache_dir).await?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = cache_dir.join(format!("{file_name}.{}.tmp", Uuid::new_v4().simple()));

    let written = match fs::write(&tmp, bytes).await {
        Ok(()) => fs::rename(&tmp, target).await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&tmp).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(tmp = %tmp.display(), error = %cleanup, "Failed to remove temp thumbnail");
            }
        }
        return Err(AppError::with_source(
            ErrorKind::Storage,
            "Failed to write thumbnail",
            e,
        ));
    }

    Ok(())
}
