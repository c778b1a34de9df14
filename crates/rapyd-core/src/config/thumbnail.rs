//! Thumbnail cache configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Thumbnail generation and cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Cache directory. Purged at process start; also holds folder archives.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Upper bound for the longer side of a thumbnail, in pixels.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    /// JPEG encoder quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// `ffmpeg` executable used to grab video frames.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// `ffprobe` executable used to count video frames.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
    /// Timeout for each external video tool invocation, in seconds.
    #[serde(default = "default_video_timeout")]
    pub video_timeout_seconds: u64,
    /// Videos with more frames than this are sampled at one third of their length.
    #[serde(default = "default_min_frames_for_seek")]
    pub min_frames_for_seek: u64,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            video_timeout_seconds: default_video_timeout(),
            min_frames_for_seek: default_min_frames_for_seek(),
        }
    }
}

impl ThumbnailConfig {
    /// Scratch directory for folder archives, inside the cache directory.
    pub fn archive_dir(&self) -> PathBuf {
        self.cache_dir.join("archives")
    }
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("RapydShare_Thumbs")
}

fn default_max_dimension() -> u32 {
    300
}

fn default_jpeg_quality() -> u8 {
    60
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_video_timeout() -> u64 {
    20
}

fn default_min_frames_for_seek() -> u64 {
    30
}
