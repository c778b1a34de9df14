//! Core traits defined in `rapyd-core` and implemented by other crates.

pub mod renderer;

pub use renderer::ThumbnailRenderer;
