//! Directory listing handler.

use axum::Json;
use axum::extract::{Query, State};
use tracing::debug;

use rapyd_core::types::DirectoryEntry;
use rapyd_storage::list_directory;

use crate::error::ApiResult;
use crate::extractors::{AuthUser, PathQuery};
use crate::state::AppState;

/// GET /api/files?path=...
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PathQuery>,
) -> ApiResult<Json<Vec<DirectoryEntry>>> {
    let dir = state.resolver.resolve(query.or_root()).await?;
    let entries = list_directory(&dir).await?;

    debug!(
        user = %auth.username,
        path = %dir.relative,
        count = entries.len(),
        "Listed directory"
    );

    Ok(Json(entries))
}
