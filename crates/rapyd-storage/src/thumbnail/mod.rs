//! Thumbnail rendering and the on-disk thumbnail cache.

pub mod cache;
pub mod renderer;
pub mod video;

pub use cache::{ThumbnailCache, cache_key};
pub use renderer::{MediaRenderer, encode_thumbnail};
pub use video::{VideoFrameExtractor, VideoProbe};
