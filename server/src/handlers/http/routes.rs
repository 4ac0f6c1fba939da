use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::AppState;
use crate::handlers::http::{beep, products, utils::*};

// ---------------------------------------------------------------------------
// Handler type alias
// ---------------------------------------------------------------------------

type RouteHandler = Box<
    dyn Fn(
            Request<hyper::body::Incoming>,
            AppState,
        )
            -> Pin<Box<dyn Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send>>
        + Send
        + Sync,
>;

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

struct Route {
    method: Method,
    path: String,
    handler: RouteHandler,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    fn add<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request<hyper::body::Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            handler: Box::new(move |req, state| Box::pin(handler(req, state))),
        });
        self
    }

    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<hyper::body::Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        self.add(Method::GET, path, handler)
    }

    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<hyper::body::Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        self.add(Method::POST, path, handler)
    }

    pub fn put<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<hyper::body::Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        self.add(Method::PUT, path, handler)
    }

    pub fn delete<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<hyper::body::Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        self.add(Method::DELETE, path, handler)
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    pub async fn route(
        &self,
        req: Request<hyper::body::Incoming>,
        state: AppState,
    ) -> Result<Response<BoxBody<Bytes, Infallible>>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        if let Some(route) = self
            .routes
            .iter()
            .find(|r| r.method == method && Self::path_matches(&r.path, &path))
        {
            return (route.handler)(req, state).await;
        }

        // Unmatched GET requests fall back to static files.
        if method == Method::GET {
            if let Some(file) = resolve_static_path(&state.config.paths.web_dir, &path) {
                if let Some(response) = deliver_static_file(&file).await? {
                    return Ok(response);
                }
            }
        }

        debug!("No route for {} {}", method, path);
        deliver_error_json("NOT_FOUND", "Endpoint not found", StatusCode::NOT_FOUND)
            .context("Failed to deliver 404 response")
    }

    // ── Path matching ─────────────────────────────────────────────────────────

    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        // Strip query string from incoming request path before comparing.
        let clean = request_path.split('?').next().unwrap_or(request_path);

        if route_path == clean {
            return true;
        }

        // Segment-by-segment matching for `:param` wildcards.
        // e.g.  "/update-product/:id"  matches  "/update-product/A1"
        let route_segs: Vec<&str> = route_path.split('/').collect();
        let path_segs: Vec<&str> = clean.split('/').collect();

        if route_segs.len() != path_segs.len() {
            return false;
        }

        route_segs
            .iter()
            .zip(path_segs.iter())
            .all(|(r, p)| r.starts_with(':') || r == p)
    }
}

/// Percent-decoded path segment at `index` ("/update-product/A%201" → "A 1" at 2).
pub fn path_segment<B>(req: &Request<B>, index: usize) -> Option<String> {
    req.uri()
        .path()
        .split('/')
        .nth(index)
        .map(|seg| percent_decode_str(seg).decode_utf8_lossy().into_owned())
}

// ---------------------------------------------------------------------------
// Inventory API router
//
// Each command is registered exactly once. Listener connections never reach
// the router; WebSocket upgrades are split off before dispatch.
// ---------------------------------------------------------------------------

pub fn build_api_router() -> Router {
    Router::new()
        .get("/health", |_req, _state| async move {
            deliver_serialized_json(
                &serde_json::json!({ "status": "success", "health": "ok" }),
                StatusCode::OK,
            )
        })
        .get("/products", |req, state| async move {
            products::handle_list(req, state)
                .await
                .context("Product list failed")
        })
        .post("/add-product", |req, state| async move {
            products::handle_add_product(req, state)
                .await
                .context("Add product failed")
        })
        .put("/update-product/:id", |req, state| async move {
            products::handle_update_stock(req, state)
                .await
                .context("Update stock failed")
        })
        .put("/edit-product/:id", |req, state| async move {
            products::handle_edit_product(req, state)
                .await
                .context("Edit product failed")
        })
        .delete("/delete-product/:id", |req, state| async move {
            products::handle_delete_product(req, state)
                .await
                .context("Delete product failed")
        })
        .post("/save-scan", |req, state| async move {
            products::handle_save_scan(req, state)
                .await
                .context("Save scan failed")
        })
        .post("/play-beep", |req, state| async move {
            beep::handle_play_beep(req, state)
                .await
                .context("Play beep failed")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_segments_match_any_value() {
        assert!(Router::path_matches("/update-product/:id", "/update-product/A1"));
        assert!(Router::path_matches("/products", "/products?x=1"));
        assert!(!Router::path_matches("/update-product/:id", "/update-product"));
        assert!(!Router::path_matches("/delete-product/:id", "/update-product/A1"));
    }

    #[test]
    fn path_segment_is_percent_decoded() {
        let req = Request::builder()
            .uri("/delete-product/Blue%20Widget")
            .body(())
            .unwrap();
        assert_eq!(path_segment(&req, 2).as_deref(), Some("Blue Widget"));
        assert_eq!(path_segment(&req, 3), None);
    }

    #[test]
    fn every_command_is_registered_once() {
        let router = build_api_router();
        assert_eq!(router.route_count(), 8);

        let mut seen = std::collections::HashSet::new();
        for route in &router.routes {
            assert!(seen.insert((route.method.clone(), route.path.clone())));
        }
    }
}
