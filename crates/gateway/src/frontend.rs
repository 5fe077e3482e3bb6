//! Static frontend served from disk.
//!
//! Unknown paths fall back to `index.html` so client-side routes resolve.

use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info};

/// Build a router serving `static_dir`, or `None` when the directory is absent.
pub fn frontend_router(static_dir: &Path) -> Option<Router> {
    if !static_dir.is_dir() {
        debug!(dir = %static_dir.display(), "No frontend directory, static serving disabled");
        return None;
    }

    info!(dir = %static_dir.display(), "Serving frontend");
    let index = ServeFile::new(static_dir.join("index.html"));
    Some(Router::new().fallback_service(ServeDir::new(static_dir).fallback(index)))
}
