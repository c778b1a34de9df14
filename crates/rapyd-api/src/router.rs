//! Route definitions for the RapydShare HTTP API.
//!
//! All file routes live under `/api` and require the auth gate through the
//! `AuthUser` extractor; `/api/health` does not. Everything else falls
//! through to the front-end bundle.

use axum::{Router, middleware as axum_middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::spa::spa_service;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/files", get(handlers::files::list_files))
        .route("/thumb", get(handlers::thumb::thumbnail))
        .route("/download", get(handlers::download::download))
        .route("/download_folder", get(handlers::download::download_folder))
        .route("/view", get(handlers::download::view))
        .route("/health", get(handlers::health::health))
        .fallback(handlers::api_not_found);

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);
    let spa = spa_service(&state.config.share.frontend_dir);

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(spa)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}
