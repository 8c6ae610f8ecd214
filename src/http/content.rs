//! Store-backed content responses.

use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::catalog::{ContentStore, StoreError};

/// Serve `raw_path` out of a content store: resolve directory-style paths
/// to `index.html`, pick a content type from the extension, and map store
/// errors to 404/500.
pub(crate) async fn serve_path(store: Arc<dyn ContentStore>, raw_path: &str) -> Response {
    let Some(path) = resolve_path(raw_path) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match store.read(&path).await {
        Ok(body) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], body).into_response()
        }
        Err(StoreError::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            tracing::error!(path = %path, error = %err, "content read failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Normalise a request path into a store path. Empty and trailing-slash
/// paths resolve to `index.html`; dot segments do not resolve at all.
fn resolve_path(raw: &str) -> Option<String> {
    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            other => segments.push(other),
        }
    }
    if segments.is_empty() || raw.ends_with('/') {
        segments.push("index.html");
    }
    Some(segments.join("/"))
}
