//! Static front-end fallback.
//!
//! Any path no API route claims is served from the bundled single-page
//! application. Unknown paths get its `index.html` so client-side routing
//! works; without a bundle everything falls through to 404.

use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

/// Service serving the front-end bundle at `frontend_dir`.
pub fn spa_service(frontend_dir: &Path) -> ServeDir<ServeFile> {
    if !frontend_dir.is_dir() {
        tracing::warn!(
            dir = %frontend_dir.display(),
            "Front-end bundle not found, only the API will be served"
        );
    }
    ServeDir::new(frontend_dir).fallback(ServeFile::new(frontend_dir.join("index.html")))
}
