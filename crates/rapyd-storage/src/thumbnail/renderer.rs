//! Image and video thumbnail rendering.

use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};

use rapyd_core::config::ThumbnailConfig;
use rapyd_core::error::{AppError, ErrorKind};
use rapyd_core::result::AppResult;
use rapyd_core::traits::ThumbnailRenderer;
use rapyd_core::types::EntryCategory;

use super::video::VideoFrameExtractor;

/// Renders JPEG thumbnails for images (decoded in-process) and videos
/// (frame grabbed through `ffmpeg`).
#[derive(Debug, Clone)]
pub struct MediaRenderer {
    max_dimension: u32,
    jpeg_quality: u8,
    video: VideoFrameExtractor,
}

impl MediaRenderer {
    /// Create a renderer from the thumbnail settings.
    pub fn new(config: &ThumbnailConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
            jpeg_quality: config.jpeg_quality,
            video: VideoFrameExtractor::new(config),
        }
    }
}

#[async_trait]
impl ThumbnailRenderer for MediaRenderer {
    async fn render(&self, source: &Path, category: EntryCategory) -> AppResult<Bytes> {
        let (max_dimension, quality) = (self.max_dimension, self.jpeg_quality);

        let job: Box<dyn FnOnce() -> AppResult<Bytes> + Send> = match category {
            EntryCategory::Image => {
                let path = source.to_path_buf();
                Box::new(move || {
                    let img = decode_file(&path)?;
                    encode_thumbnail(img, max_dimension, quality)
                })
            }
            EntryCategory::Video => {
                let frame = self.video.extract_frame(source).await?;
                Box::new(move || {
                    let img = image::load_from_memory(&frame).map_err(|e| {
                        AppError::with_source(ErrorKind::NotFound, "Undecodable video frame", e)
                    })?;
                    encode_thumbnail(img, max_dimension, quality)
                })
            }
            _ => return Err(AppError::not_found("No preview available")),
        };

        tokio::task::spawn_blocking(job)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e))?
    }
}

fn decode_file(path: &Path) -> AppResult<DynamicImage> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| AppError::with_source(ErrorKind::NotFound, "Image not readable", e))?;
    reader.decode().map_err(|e| {
        AppError::with_source(ErrorKind::NotFound, "Unsupported or corrupt image", e)
    })
}

/// Downscale `img` to fit `max_dimension` (aspect preserved, never
/// upscaled), convert to RGB and encode as JPEG.
pub fn encode_thumbnail(img: DynamicImage, max_dimension: u32, quality: u8) -> AppResult<Bytes> {
    let img = if img.width() > max_dimension || img.height() > max_dimension {
        img.thumbnail(max_dimension, max_dimension)
    } else {
        img
    };
    let rgb = img.to_rgb8();

    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&rgb)
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "JPEG encoding failed", e))?;

    Ok(Bytes::from(buf.into_inner()))
}
