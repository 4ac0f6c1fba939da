use std::convert::Infallible;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::{BodyExt, Empty, Full, combinators::BoxBody};
use hyper::{Response, StatusCode, header};
use tracing::debug;

pub fn full<T: Into<Bytes>>(chunk: T) -> BoxBody<Bytes, Infallible> {
    Full::new(chunk.into()).boxed()
}

pub fn empty() -> BoxBody<Bytes, Infallible> {
    Empty::<Bytes>::new().boxed()
}

/// Map a request path onto a file under `web_dir`. Paths that try to climb
/// out of the directory resolve to nothing.
pub fn resolve_static_path(web_dir: &str, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let relative = if relative.is_empty() { "index.html" } else { relative };

    let relative = Path::new(relative);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }

    Some(Path::new(web_dir).join(relative))
}

/// Serve a file from disk, or `Ok(None)` when there is no such file.
pub async fn deliver_static_file(path: &Path) -> Result<Option<Response<BoxBody<Bytes, Infallible>>>> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) if matches!(e.kind(), std::io::ErrorKind::NotFound | std::io::ErrorKind::IsADirectory) => {
            return Ok(None);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read static file: {}", path.display()));
        }
    };

    let mime_type = get_mime_type(path);
    debug!(
        "Delivering static file {}, size: {} bytes, mime: {}",
        path.display(),
        content.len(),
        mime_type
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(full(content))
        .map(Some)
        .map_err(|e| anyhow!("Failed to build response: {}", e))
}

/// Helper function to determine MIME type from file extension
fn get_mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()) {
        // Web documents
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",

        // Images
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Media
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("wav") => "audio/wav",

        Some("txt") => "text/plain; charset=utf-8",

        // Default
        _ => "application/octet-stream",
    }
}
