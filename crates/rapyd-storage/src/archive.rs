//! On-demand ZIP archives of shared folders.
//!
//! Archives are written to a scratch directory on the worker pool and
//! streamed to the client from disk. The [`ArchiveFile`] guard deletes the
//! file when it is dropped, which happens once the response body finishes
//! or the client disconnects.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use rapyd_core::error::{AppError, ErrorKind};
use rapyd_core::result::AppResult;

use crate::pool::WorkerPool;

/// Builds deflate-compressed ZIP archives of directories.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    scratch_dir: PathBuf,
    pool: WorkerPool,
}

impl ArchiveBuilder {
    /// Create a builder writing into `scratch_dir`.
    pub fn new(scratch_dir: impl Into<PathBuf>, pool: WorkerPool) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            pool,
        }
    }

    /// Scratch directory holding archives in progress.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Archive every file under `dir`, paths relative to `dir`.
    ///
    /// Symlinks inside the tree are skipped. Fails with `Validation` when
    /// `dir` is not a directory.
    pub async fn build_zip(&self, dir: &Path) -> AppResult<ArchiveFile> {
        match fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(AppError::validation("Path is not a directory")),
        }

        fs::create_dir_all(&self.scratch_dir).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create archive directory", e)
        })?;

        let file_name = format!(
            "dl_{}_{}.zip",
            Utc::now().format("%Y%m%dT%H%M%S"),
            Uuid::new_v4().simple()
        );
        // Guard first so a failed build still cleans up.
        let mut guard = ArchiveFile {
            path: self.scratch_dir.join(file_name),
            file_count: 0,
        };

        let source = dir.to_path_buf();
        let target = guard.path.clone();
        let file_count = self
            .pool
            .run_blocking(move || write_zip(&source, &target))
            .await?;

        info!(
            dir = %dir.display(),
            archive = %guard.path.display(),
            file_count,
            "Built folder archive"
        );

        guard.file_count = file_count;
        Ok(guard)
    }
}

fn zip_error(e: zip::result::ZipError) -> AppError {
    AppError::with_source(ErrorKind::Storage, "Failed to write archive", e)
}

/// Write the archive synchronously. Returns the number of files stored.
fn write_zip(source: &Path, target: &Path) -> AppResult<usize> {
    let file = File::create(target)
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to create archive", e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut file_count = 0;
    for entry in WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable archive entry");
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            debug!(entry = %entry.path().display(), "Skipping symlink in archive");
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if file_type.is_dir() {
            zip.add_directory(name, opts).map_err(zip_error)?;
        } else if file_type.is_file() {
            let mut input = match File::open(entry.path()) {
                Ok(f) => f,
                Err(e) => {
                    warn!(entry = %entry.path().display(), error = %e, "Skipping unreadable file");
                    continue;
                }
            };
            let large = entry.metadata().map(|m| m.len() >= u32::MAX as u64).unwrap_or(false);
            zip.start_file(name, opts.large_file(large))
                .map_err(zip_error)?;
            std::io::copy(&mut input, &mut zip).map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write archive", e)
            })?;
            file_count += 1;
        }
    }

    zip.finish()
        .map_err(zip_error)?
        .flush()
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to write archive", e))?;

    Ok(file_count)
}

/// A finished archive on disk. Deleted when dropped.
#[derive(Debug)]
pub struct ArchiveFile {
    path: PathBuf,
    file_count: usize,
}

impl ArchiveFile {
    /// Location of the archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of regular files stored.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Archive size in bytes.
    pub async fn size(&self) -> AppResult<u64> {
        Ok(fs::metadata(&self.path).await?.len())
    }

    /// Open the archive as a byte stream that owns this guard.
    pub async fn into_stream(self) -> AppResult<ArchiveStream> {
        let file = fs::File::open(&self.path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to open archive", e)
        })?;
        Ok(ArchiveStream {
            inner: ReaderStream::new(file),
            _guard: self,
        })
    }
}

impl Drop for ArchiveFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(archive = %self.path.display(), "Removed archive"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(archive = %self.path.display(), error = %e, "Failed to remove archive"),
        }
    }
}

/// Archive bytes read from disk. The file is closed before the guard
/// deletes it.
#[derive(Debug)]
pub struct ArchiveStream {
    inner: ReaderStream<fs::File>,
    _guard: ArchiveFile,
}

impl Stream for ArchiveStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
