//! # rapyd-storage
//!
//! Everything RapydShare does with the filesystem: resolving request paths
//! inside the shared root, listing directories, the on-disk thumbnail cache
//! and on-demand folder archives. Blocking work goes through the bounded
//! [`WorkerPool`].

pub mod archive;
pub mod cache_dir;
pub mod listing;
pub mod mime;
pub mod pool;
pub mod resolver;
pub mod thumbnail;

pub use archive::{ArchiveBuilder, ArchiveFile, ArchiveStream};
pub use cache_dir::prepare_cache_dir;
pub use listing::list_directory;
pub use pool::WorkerPool;
pub use resolver::{PathResolver, ResolvedPath};
pub use thumbnail::{MediaRenderer, ThumbnailCache};
