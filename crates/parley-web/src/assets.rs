//! Chat page assets
//!
//! Release builds serve the page embedded with rust-embed. Debug builds, or a
//! configured static directory, serve it from disk instead.

use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get_service,
    Router,
};
use rust_embed::Embed;
use std::path::Path;
use tower_http::services::ServeDir;

#[derive(Embed)]
#[folder = "web/dist"]
struct Assets;

const INDEX: &str = "index.html";

/// Router serving the chat page for any unmatched path
pub fn static_routes(static_dir: Option<&Path>) -> Router {
    if let Some(dir) = static_dir {
        tracing::info!("Serving static assets from: {}", dir.display());
        serve_from_dir(dir)
    } else if cfg!(debug_assertions) {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/web/dist");
        tracing::info!("Debug mode: serving static assets from: {}", dir);
        serve_from_dir(Path::new(dir))
    } else {
        tracing::info!("Release mode: serving embedded static assets");
        Router::new().fallback(embedded_handler)
    }
}

fn serve_from_dir(dir: &Path) -> Router {
    Router::new().fallback_service(
        get_service(ServeDir::new(dir).append_index_html_on_directories(true))
            .handle_error(|_| async { StatusCode::INTERNAL_SERVER_ERROR }),
    )
}

async fn embedded_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { INDEX } else { path };

    match <Assets as Embed>::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
