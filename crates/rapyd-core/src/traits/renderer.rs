//! Thumbnail renderer trait.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::EntryCategory;

/// Turns a source file into encoded thumbnail bytes.
///
/// The thumbnail cache calls this only on a cache miss, while holding a
/// worker pool permit. Implementations must not touch the cache directory.
#[async_trait]
pub trait ThumbnailRenderer: Send + Sync + std::fmt::Debug + 'static {
    /// Render a JPEG thumbnail of `source`, which has the given category.
    ///
    /// Returns a `NotFound` error for unsupported categories or undecodable
    /// input.
    async fn render(&self, source: &Path, category: EntryCategory) -> AppResult<Bytes>;
}
