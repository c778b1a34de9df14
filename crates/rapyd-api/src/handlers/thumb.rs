//! Thumbnail handler.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use rapyd_core::error::{AppError, ErrorKind};

use crate::error::ApiResult;
use crate::extractors::{AuthUser, PathQuery};
use crate::state::AppState;

/// GET /api/thumb?path=...
///
/// Any failure other than a forbidden path is reported as 404.
pub async fn thumbnail(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<PathQuery>,
) -> ApiResult<Response> {
    let resolved = state.resolver.resolve(query.required()?).await?;

    let bytes = state
        .thumbnails
        .get_or_create(&resolved.absolute)
        .await
        .map_err(|e| match e.kind {
            ErrorKind::NotFound | ErrorKind::Forbidden => e,
            _ => AppError::with_source(ErrorKind::NotFound, "Thumbnail not available", e),
        })?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from(bytes))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
