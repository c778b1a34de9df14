//! Integration tests for thumbnail generation and caching.

mod helpers;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::{StatusCode, header};
use bytes::Bytes;

use helpers::TestApp;
use rapyd_core::config::AppConfig;
use rapyd_core::result::AppResult;
use rapyd_core::traits::ThumbnailRenderer;
use rapyd_core::types::EntryCategory;
use rapyd_storage::MediaRenderer;

/// Real renderer that counts how often it runs.
#[derive(Debug)]
struct CountingRenderer {
    inner: MediaRenderer,
    calls: AtomicUsize,
}

#[async_trait]
impl ThumbnailRenderer for CountingRenderer {
    async fn render(&self, source: &Path, category: EntryCategory) -> AppResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.render(source, category).await
    }
}

fn counting_app() -> (TestApp, Arc<CountingRenderer>) {
    let renderer = Arc::new(CountingRenderer {
        inner: MediaRenderer::new(&AppConfig::default().thumbnail),
        calls: AtomicUsize::new(0),
    });
    let app = TestApp::build(|_| {}, Some(renderer.clone()));
    (app, renderer)
}

fn cached_thumbnails(app: &TestApp) -> usize {
    std::fs::read_dir(app.cache_dir())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "jpg"))
        .count()
}

#[tokio::test]
async fn test_image_thumbnail() {
    let app = TestApp::new();
    app.write_png("pics/wide.png", 800, 600);

    let response = app.get("/api/thumb?path=pics/wide.png").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "image/jpeg");
    assert_eq!(response.header(header::CACHE_CONTROL), "private, max-age=3600");
    assert_eq!(
        response.header(header::CONTENT_LENGTH),
        response.body.len().to_string()
    );

    let thumb = image::load_from_memory(&response.body).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (300, 225));
    assert_eq!(cached_thumbnails(&app), 1);
}

#[tokio::test]
async fn test_small_image_not_upscaled() {
    let app = TestApp::new();
    app.write_png("tiny.png", 40, 20);

    let response = app.get("/api/thumb?path=tiny.png").await;
    assert_eq!(response.status, StatusCode::OK);

    let thumb = image::load_from_memory(&response.body).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (40, 20));
}

#[tokio::test]
async fn test_repeat_request_served_from_cache() {
    let (app, renderer) = counting_app();
    app.write_png("a.png", 500, 500);

    let first = app.get("/api/thumb?path=a.png").await;
    let second = app.get("/api/thumb?path=a.png").await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.body, second.body);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_equivalent_paths_share_cache_entry() {
    let (app, renderer) = counting_app();
    app.write_png("pics/a.png", 64, 64);

    for uri in [
        "/api/thumb?path=pics/a.png",
        "/api/thumb?path=pics//./a.png",
        "/api/thumb?path=pics%5Ca.png",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
    }

    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cached_thumbnails(&app), 1);
}

#[tokio::test]
async fn test_concurrent_requests_render_once() {
    let (app, renderer) = counting_app();
    app.write_png("big.png", 1600, 1200);
    let app = Arc::new(app);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.get("/api/thumb?path=big.png").await
        }));
    }

    let mut bodies = Vec::new();
    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        bodies.push(response.body);
    }

    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cached_thumbnails(&app), 1);
}

#[tokio::test]
async fn test_non_media_is_not_found() {
    let (app, renderer) = counting_app();
    app.write("notes.txt", "plain text");
    app.mkdir("folder");

    for uri in [
        "/api/thumb?path=notes.txt",
        "/api/thumb?path=folder",
        "/api/thumb?path=missing.png",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
    }
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_corrupt_image_is_not_found() {
    let app = TestApp::new();
    app.write("broken.png", b"definitely not a png");

    let response = app.get("/api/thumb?path=broken.png").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(cached_thumbnails(&app), 0);

    let leftovers = std::fs::read_dir(app.cache_dir())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
        .count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_unreadable_video_is_not_found() {
    let app = TestApp::with_config(|config| {
        config.thumbnail.ffmpeg_path = "rapyd-no-such-ffmpeg".to_string();
        config.thumbnail.ffprobe_path = "rapyd-no-such-ffprobe".to_string();
    });
    app.write("clip.mp4", b"not a video");

    let response = app.get("/api/thumb?path=clip.mp4").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_thumb_traversal_is_forbidden() {
    let app = TestApp::new();

    let response = app.get("/api/thumb?path=../outside.png").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
