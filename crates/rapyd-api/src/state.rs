//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use rapyd_auth::AuthGate;
use rapyd_core::config::AppConfig;
use rapyd_core::result::AppResult;
use rapyd_core::traits::ThumbnailRenderer;
use rapyd_storage::{ArchiveBuilder, MediaRenderer, PathResolver, ThumbnailCache, WorkerPool};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Validated configuration of this server instance
    pub config: Arc<AppConfig>,
    /// Containment-checked path resolution
    pub resolver: Arc<PathResolver>,
    /// Thumbnail cache
    pub thumbnails: ThumbnailCache,
    /// Folder archive builder
    pub archives: ArchiveBuilder,
    /// Basic auth gate
    pub auth: Arc<AuthGate>,
    /// When this instance was built
    pub started_at: Instant,
}

impl AppState {
    /// Build the state for a validated configuration.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let renderer = Arc::new(MediaRenderer::new(&config.thumbnail));
        Self::with_renderer(config, renderer)
    }

    /// Build the state with a specific thumbnail renderer.
    pub fn with_renderer(
        config: AppConfig,
        renderer: Arc<dyn ThumbnailRenderer>,
    ) -> AppResult<Self> {
        let pool = WorkerPool::new(config.worker.concurrency);
        let resolver = PathResolver::new(&config.share.root_dir)?;
        let thumbnails =
            ThumbnailCache::new(config.thumbnail.cache_dir.clone(), pool.clone(), renderer);
        let archives = ArchiveBuilder::new(config.thumbnail.archive_dir(), pool);
        let auth = AuthGate::new(&config.auth);

        Ok(Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
            thumbnails,
            archives,
            auth: Arc::new(auth),
            started_at: Instant::now(),
        })
    }
}
