//! Integration tests for listing, downloads, inline view and folder archives.

mod helpers;

use std::io::{Cursor, Read};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};

use helpers::TestApp;

#[tokio::test]
async fn test_list_root() {
    let app = TestApp::new();
    app.mkdir("pics");
    app.mkdir("Docs");
    app.write("readme.txt", "hello");
    app.write("Clip.mp4", "not a real video");

    let response = app.get("/api/files").await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    let entries = body.as_array().expect("listing is an array");
    let names: Vec<_> = entries.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Docs", "pics", "Clip.mp4", "readme.txt"]);

    let readme = &entries[3];
    assert_eq!(readme["path"], "readme.txt");
    assert_eq!(readme["is_dir"], false);
    assert_eq!(readme["size"], 5);
    assert_eq!(readme["mime"], "text/plain");
    assert_eq!(readme["type"], "file");
    assert!(readme["mtime"].as_f64().unwrap() > 0.0);

    assert_eq!(entries[0]["type"], "folder");
    assert!(entries[0]["mime"].is_null());
    assert_eq!(entries[2]["type"], "video");
}

#[tokio::test]
async fn test_list_nested_path() {
    let app = TestApp::new();
    app.write_png("pics/2024/a.png", 4, 4);

    let response = app.get("/api/files?path=pics/2024").await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body[0]["path"], "pics/2024/a.png");
    assert_eq!(body[0]["type"], "image");
}

#[tokio::test]
async fn test_list_traversal_is_forbidden() {
    let app = TestApp::new();

    for uri in [
        "/api/files?path=../../etc",
        "/api/files?path=..",
        "/api/files?path=..%5C..%5Cetc",
        "/api/files?path=pics/../../",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(response.json()["error"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn test_list_missing_and_file() {
    let app = TestApp::new();
    app.write("file.txt", "x");

    let response = app.get("/api/files?path=nope").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get("/api/files?path=file.txt").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_bodies_hide_paths() {
    let app = TestApp::new();

    let response = app.get("/api/files?path=missing/deeper").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let body = String::from_utf8(response.body).unwrap();
    assert!(!body.contains(app.share.to_string_lossy().as_ref()));
}

#[tokio::test]
async fn test_download_file() {
    let app = TestApp::new();
    app.write("docs/report.pdf", b"%PDF-1.4 fake");

    let response = app.get("/api/download?path=docs/report.pdf").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"%PDF-1.4 fake");
    assert_eq!(response.header(header::CONTENT_TYPE), "application/pdf");
    assert_eq!(response.header(header::CONTENT_LENGTH), "13");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
    );
}

#[tokio::test]
async fn test_download_unicode_name() {
    let app = TestApp::new();
    app.write("résumé.txt", "cv");

    let response = app.get("/api/download?path=r%C3%A9sum%C3%A9.txt").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .header(header::CONTENT_DISPOSITION)
            .ends_with("filename*=UTF-8''r%C3%A9sum%C3%A9.txt")
    );
}

#[tokio::test]
async fn test_download_range() {
    let app = TestApp::new();
    app.write("numbers.txt", "0123456789");

    let request = Request::get("/api/download?path=numbers.txt")
        .header(header::RANGE, "bytes=2-5")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.body, b"2345");
}

#[tokio::test]
async fn test_download_rejects_dirs_and_missing() {
    let app = TestApp::new();
    app.mkdir("pics");

    let response = app.get("/api/download?path=pics").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get("/api/download?path=ghost.bin").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get("/api/download?path=../secret").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_path_parameter() {
    let app = TestApp::new();

    for uri in [
        "/api/download",
        "/api/view",
        "/api/thumb",
        "/api/download_folder",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.json()["error"], "INVALID_REQUEST");
    }
}

#[tokio::test]
async fn test_view_inline() {
    let app = TestApp::new();
    app.write_png("pics/a.png", 8, 8);

    let response = app.get("/api/view?path=pics/a.png").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "image/png");
    assert!(response.header(header::CONTENT_DISPOSITION).starts_with("inline;"));
    assert_eq!(&response.body[1..4], b"PNG");

    let response = app.get("/api/view?path=pics/missing.png").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_folder() {
    let app = TestApp::new();
    app.write("pics/one.txt", "1");
    app.write("pics/two.txt", "22");
    app.write("pics/three.txt", "333");

    let response = app.get("/api/download_folder?path=pics").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "application/zip");
    assert!(
        response
            .header(header::CONTENT_DISPOSITION)
            .starts_with("attachment; filename=\"pics.zip\"")
    );

    let mut zip = zip::ZipArchive::new(Cursor::new(response.body)).unwrap();
    let mut names: Vec<String> = zip.file_names().map(String::from).collect();
    names.sort();
    assert_eq!(names, vec!["one.txt", "three.txt", "two.txt"]);

    let mut content = String::new();
    zip.by_name("three.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "333");
}

#[tokio::test]
async fn test_download_folder_cleans_scratch() {
    let app = TestApp::new();
    app.write("album/a.txt", "a");

    let response = app.get("/api/download_folder?path=album").await;
    assert_eq!(response.status, StatusCode::OK);

    let leftovers = std::fs::read_dir(app.archive_dir()).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_download_folder_of_root_and_nested() {
    let app = TestApp::new();
    app.write("a/b/c.txt", "c");

    let response = app.get("/api/download_folder?path=a").await;
    assert_eq!(response.status, StatusCode::OK);
    let zip = zip::ZipArchive::new(Cursor::new(response.body)).unwrap();
    let mut names: Vec<&str> = zip.file_names().collect();
    names.sort();
    assert_eq!(names, vec!["b/", "b/c.txt"]);

    let response = app.get("/api/download_folder?path=").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .header(header::CONTENT_DISPOSITION)
            .starts_with("attachment; filename=\"share.zip\"")
    );
}

#[tokio::test]
async fn test_download_folder_rejects_file() {
    let app = TestApp::new();
    app.write("notes.txt", "n");

    let response = app.get("/api/download_folder?path=notes.txt").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/api/download_folder?path=nothing-here").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.get("/api/health").await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_unknown_api_route() {
    let app = TestApp::new();

    let response = app.get("/api/nothing").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_spa_fallback() {
    let app = TestApp::new();

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let frontend = &app.config.share.frontend_dir;
    std::fs::create_dir_all(frontend.join("assets")).unwrap();
    std::fs::write(frontend.join("index.html"), "<html>app</html>").unwrap();
    std::fs::write(frontend.join("assets/app.js"), "console.log(1)").unwrap();

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"<html>app</html>");

    let response = app.get("/browse/deep/link").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"<html>app</html>");

    let response = app.get("/assets/app.js").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"console.log(1)");
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_escape_is_forbidden() {
    let app = TestApp::new();
    let outside = app.dir.path().join("outside.txt");
    std::fs::write(&outside, "secret").unwrap();
    std::os::unix::fs::symlink(&outside, app.share.join("link.txt")).unwrap();

    let response = app.get("/api/download?path=link.txt").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get("/api/view?path=link.txt").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_loop_is_not_found() {
    let app = TestApp::new();
    std::os::unix::fs::symlink("b.png", app.share.join("a.png")).unwrap();
    std::os::unix::fs::symlink("a.png", app.share.join("b.png")).unwrap();

    for uri in [
        "/api/thumb?path=a.png",
        "/api/download?path=a.png",
        "/api/view?path=a.png",
        "/api/files?path=a.png",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
    }

    // The loop itself does not break listing its parent.
    let response = app.get("/api/files").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json().as_array().unwrap().len(), 0);
}
