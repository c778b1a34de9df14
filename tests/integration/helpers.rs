//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use rapyd_api::{AppState, build_router};
use rapyd_core::config::AppConfig;
use rapyd_core::traits::ThumbnailRenderer;

/// Test application over a temporary shared directory
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Validated application config
    pub config: AppConfig,
    /// Canonical shared root
    pub share: PathBuf,
    /// Temp dir holding the share, cache and front-end directories
    pub dir: TempDir,
}

impl TestApp {
    /// Auth disabled, real renderer, no front-end bundle.
    pub fn new() -> Self {
        Self::build(|_| {}, None)
    }

    /// Adjust the default test config before the app is built.
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        Self::build(adjust, None)
    }

    /// Build with an optional renderer override.
    pub fn build(
        adjust: impl FnOnce(&mut AppConfig),
        renderer: Option<Arc<dyn ThumbnailRenderer>>,
    ) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let share = dir.path().join("share");
        std::fs::create_dir_all(&share).expect("Failed to create share dir");

        let mut config = AppConfig::default();
        config.share.root_dir = share;
        config.share.frontend_dir = dir.path().join("frontend");
        config.thumbnail.cache_dir = dir.path().join("cache");
        config.logging.level = "debug".to_string();
        adjust(&mut config);
        config.validate().expect("Invalid test config");

        std::fs::create_dir_all(config.thumbnail.archive_dir())
            .expect("Failed to create cache dir");

        let state = match renderer {
            Some(renderer) => AppState::with_renderer(config.clone(), renderer),
            None => AppState::new(config.clone()),
        }
        .expect("Failed to build state");

        Self {
            router: build_router(state),
            share: config.share.root_dir.clone(),
            config,
            dir,
        }
    }

    /// Write a file under the shared root, creating parent directories.
    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.share.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// Create a directory under the shared root.
    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.share.join(rel);
        std::fs::create_dir_all(&path).expect("Failed to create dir");
        path
    }

    /// Write a PNG of the given size under the shared root.
    pub fn write_png(&self, rel: &str, width: u32, height: u32) -> PathBuf {
        let path = self.share.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        })
        .save(&path)
        .expect("Failed to write png");
        path
    }

    /// Archive scratch directory.
    pub fn archive_dir(&self) -> PathBuf {
        self.config.thumbnail.archive_dir()
    }

    /// Thumbnail cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.config.thumbnail.cache_dir
    }

    /// GET without credentials.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).expect("Failed to build request"))
            .await
    }

    /// GET with Basic credentials.
    pub async fn get_as(&self, uri: &str, username: &str, password: &str) -> TestResponse {
        let token = BASE64.encode(format!("{username}:{password}"));
        let req = Request::get(uri)
            .header(header::AUTHORIZATION, format!("Basic {token}"))
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Send any request to the router and collect the whole body.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON, `Null` if it is not JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// A header as a string, empty if absent.
    pub fn header(&self, name: header::HeaderName) -> String {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}
