//! Representative frame extraction for video thumbnails.
//!
//! Uses `ffprobe` for frame count, rate and duration, and `ffmpeg` with an
//! input seek to decode a single frame as PNG on stdout. Both run as child processes with a timeout and are killed
//! if the calling future is dropped.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use rapyd_core::config::ThumbnailConfig;
use rapyd_core::error::{AppError, ErrorKind};
use rapyd_core::result::AppResult;

/// Runs `ffprobe`/`ffmpeg` to pull one frame out of a video.
#[derive(Debug, Clone)]
pub struct VideoFrameExtractor {
    ffmpeg: String,
    ffprobe: String,
    timeout: Duration,
    min_frames_for_seek: u64,
}

impl VideoFrameExtractor {
    /// Create an extractor from the thumbnail settings.
    pub fn new(config: &ThumbnailConfig) -> Self {
        Self {
            ffmpeg: config.ffmpeg_path.clone(),
            ffprobe: config.ffprobe_path.clone(),
            timeout: Duration::from_secs(config.video_timeout_seconds.max(1)),
            min_frames_for_seek: config.min_frames_for_seek,
        }
    }

    /// Pick the frame to sample: one third in for long enough videos,
    /// otherwise the first frame.
    pub fn target_frame(total_frames: Option<u64>, min_frames_for_seek: u64) -> u64 {
        match total_frames {
            Some(total) if total > min_frames_for_seek => total / 3,
            _ => 0,
        }
    }

    /// Frame count, frame rate and duration as reported by `ffprobe`.
    pub async fn probe(&self, source: &Path) -> Option<VideoProbe> {
        let output = self
            .run(
                &self.ffprobe,
                [
                    OsStr::new("-v"),
                    OsStr::new("error"),
                    OsStr::new("-select_streams"),
                    OsStr::new("v:0"),
                    OsStr::new("-show_entries"),
                    OsStr::new("stream=nb_frames,r_frame_rate:format=duration"),
                    OsStr::new("-of"),
                    OsStr::new("default=noprint_wrappers=1"),
                    source.as_os_str(),
                ],
            )
            .await
            .ok()?;

        Some(VideoProbe::parse(&String::from_utf8_lossy(&output)))
    }

    /// Decode the representative frame of `source` and return it PNG-encoded.
    ///
    /// The target frame is turned into a timestamp and passed as an input
    /// seek, so ffmpeg jumps to the nearest keyframe instead of decoding
    /// everything before it.
    pub async fn extract_frame(&self, source: &Path) -> AppResult<Vec<u8>> {
        let probe = self.probe(source).await.unwrap_or_default();
        let total = probe.total_frames();
        let index = Self::target_frame(total, self.min_frames_for_seek);
        let seek = probe.timestamp_of(index);
        debug!(source = %source.display(), ?total, index, seek, "Extracting video frame");

        let seek = format!("{seek:.3}");
        let frame = self
            .run(
                &self.ffmpeg,
                [
                    OsStr::new("-v"),
                    OsStr::new("error"),
                    OsStr::new("-nostdin"),
                    OsStr::new("-ss"),
                    OsStr::new(&seek),
                    OsStr::new("-i"),
                    source.as_os_str(),
                    OsStr::new("-frames:v"),
                    OsStr::new("1"),
                    OsStr::new("-f"),
                    OsStr::new("image2pipe"),
                    OsStr::new("-vcodec"),
                    OsStr::new("png"),
                    OsStr::new("-"),
                ],
            )
            .await?;

        if frame.is_empty() {
            return Err(AppError::not_found("Video has no decodable frame"));
        }
        Ok(frame)
    }

    /// Run a tool and return its stdout. Non-zero exit, spawn failure and
    /// timeout all map to `NotFound`.
    async fn run<'a, I>(&self, program: &str, args: I) -> AppResult<Vec<u8>>
    where
        I: IntoIterator<Item = &'a OsStr>,
    {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => Ok(output.stdout),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(
                    program,
                    code = ?output.status.code(),
                    stderr = %stderr.chars().take(500).collect::<String>(),
                    "Video tool failed"
                );
                Err(AppError::not_found("Video frame not available"))
            }
            Ok(Err(e)) => {
                warn!(program, error = %e, "Failed to spawn video tool");
                Err(AppError::with_source(
                    ErrorKind::NotFound,
                    "Video frame not available",
                    e,
                ))
            }
            Err(_) => {
                warn!(program, timeout_secs = self.timeout.as_secs(), "Video tool timed out");
                Err(AppError::not_found("Video frame not available"))
            }
        }
    }
}

/// Stream facts needed to pick a frame. Missing or `N/A` values are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VideoProbe {
    /// `nb_frames` of the first video stream.
    pub frames: Option<u64>,
    /// `r_frame_rate` as frames per second.
    pub fps: Option<f64>,
    /// Container duration in seconds.
    pub duration: Option<f64>,
}

impl VideoProbe {
    /// Parse `key=value` lines printed by `ffprobe -of default=noprint_wrappers=1`.
    pub fn parse(output: &str) -> Self {
        let mut probe = Self::default();
        for line in output.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            match key {
                "nb_frames" => probe.frames = value.parse().ok(),
                "r_frame_rate" => probe.fps = parse_rate(value),
                "duration" => {
                    probe.duration = value.parse().ok().filter(|d: &f64| d.is_finite() && *d > 0.0)
                }
                _ => {}
            }
        }
        probe
    }

    /// Reported frame count, or an estimate from duration and frame rate
    /// for containers that do not store one (MKV, WebM).
    pub fn total_frames(&self) -> Option<u64> {
        self.frames.or_else(|| match (self.duration, self.fps) {
            (Some(duration), Some(fps)) => Some((duration * fps).floor() as u64),
            _ => None,
        })
    }

    /// Presentation time of frame `index` in seconds, 0 without a frame rate.
    pub fn timestamp_of(&self, index: u64) -> f64 {
        match self.fps {
            Some(fps) if index > 0 => index as f64 / fps,
            _ => 0.0,
        }
    }
}

/// `num/den` or a plain number; zero and malformed rates are `None`.
fn parse_rate(value: &str) -> Option<f64> {
    let rate = match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => value.parse().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}
