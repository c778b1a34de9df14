//! File download, inline view and folder archive handlers.

use std::path::Path;

use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::info;

use rapyd_core::error::AppError;
use rapyd_storage::ResolvedPath;

use crate::error::ApiResult;
use crate::extractors::{AuthUser, PathQuery};
use crate::state::AppState;

/// RFC 5987 `attr-char` minus alphanumerics.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Build a `Content-Disposition` value carrying both an ASCII fallback
/// name and the UTF-8 name.
pub fn content_disposition(disposition: &str, filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "{disposition}; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(filename, ATTR_CHAR)
    )
}

/// GET /api/download?path=...
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PathQuery>,
    request: Request,
) -> ApiResult<Response> {
    let resolved = state.resolver.resolve(query.required()?).await?;
    let name = regular_file_name(&resolved).await?;

    info!(user = %auth.username, path = %resolved.relative, "File download");
    serve_file(
        &resolved.absolute,
        request,
        content_disposition("attachment", &name),
    )
    .await
}

/// GET /api/view?path=...
///
/// Raw bytes for inline display and media playback. Range requests are
/// honoured so players can seek.
pub async fn view(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<PathQuery>,
    request: Request,
) -> ApiResult<Response> {
    let resolved = state.resolver.resolve(query.required()?).await?;
    let name = regular_file_name(&resolved).await?;

    serve_file(&resolved.absolute, request, content_disposition("inline", &name)).await
}

/// GET /api/download_folder?path=...
pub async fn download_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PathQuery>,
) -> ApiResult<Response> {
    let resolved = state.resolver.resolve(query.required()?).await?;
    let archive = state.archives.build_zip(&resolved.absolute).await?;

    let dir_name = resolved
        .absolute
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "archive".to_string());
    let filename = format!("{dir_name}.zip");

    info!(
        user = %auth.username,
        path = %resolved.relative,
        files = archive.file_count(),
        "Folder download"
    );

    let size = archive.size().await?;
    let stream = archive.into_stream().await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition("attachment", &filename),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// Name of the resolved path if it is a regular file, `NotFound` otherwise.
async fn regular_file_name(resolved: &ResolvedPath) -> Result<String, AppError> {
    match tokio::fs::metadata(&resolved.absolute).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(AppError::not_found("File not found")),
    }
    resolved
        .absolute
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::not_found("File not found"))
}

/// Stream a file with `ServeFile` (MIME guess, `Content-Length`, ranges)
/// and attach the disposition header to successful responses.
async fn serve_file(path: &Path, request: Request, disposition: String) -> ApiResult<Response> {
    let response = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        return Err(AppError::not_found("File not found").into());
    }

    let mut response = response.map(Body::new);
    if response.status().is_success() {
        let value = HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::internal(format!("Invalid header value: {e}")))?;
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}
