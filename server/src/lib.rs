//! Inventory server: a JSON-file product store kept in sync with every
//! connected screen over WebSocket.
//!
//! Requests flow `handlers::http` → [`inventory::CommandProcessor`] →
//! [`store::JsonFileStore`], and each committed change fans out through
//! [`handlers::hub::NotificationHub`] to the sockets in `handlers::ws`.

use std::convert::Infallible;
use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::server::conn::http1;
use hyper::{Request, Response};
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use shared::types::AppConfig;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

pub mod error;
pub mod handlers;
pub mod inventory;
pub mod store;

use handlers::http::{Router, build_api_router, utils::internal_error_response};
use handlers::hub::NotificationHub;
use handlers::ws::{handle_websocket_upgrade, is_websocket_upgrade};
use inventory::CommandProcessor;
use store::JsonFileStore;

/// Everything a request needs, built once at startup and cloned per
/// connection.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub processor: Arc<CommandProcessor>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let hub = Arc::new(NotificationHub::new(config.hub.listener_buffer));
        let store = JsonFileStore::new(&config.paths.data_file);
        Self {
            processor: Arc::new(CommandProcessor::new(store, hub)),
            config: Arc::new(config),
        }
    }

    pub fn hub(&self) -> &Arc<NotificationHub> {
        self.processor.hub()
    }
}

/// Split off WebSocket handshakes, route everything else.
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    router: Arc<Router>,
    state: AppState,
) -> Response<BoxBody<Bytes, Infallible>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let result = if is_websocket_upgrade(&req) {
        debug!("WebSocket handshake on {}", path);
        handle_websocket_upgrade(req, state.hub().clone()).await
    } else {
        router.route(req, state).await
    };

    result.unwrap_or_else(|e| {
        error!("{} {} failed: {:#}", method, path, e);
        internal_error_response()
    })
}

/// Accept connections until the listener fails. Each connection is served
/// on its own task with upgrades enabled for listener sockets.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let router = Arc::new(build_api_router());
    info!("Serving {:?} on {}", router, listener.local_addr()?);

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        let io = TokioIo::new(stream);

        let router = router.clone();
        let state = state.clone();
        let service = ServiceBuilder::new()
            .layer(CorsLayer::permissive())
            .service_fn(move |req| {
                let router = router.clone();
                let state = state.clone();
                async move { Ok::<_, Infallible>(handle_request(req, router, state).await) }
            });

        tokio::task::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .timer(TokioTimer::new())
                .serve_connection(io, TowerToHyperService::new(service))
                .with_upgrades()
                .await
            {
                debug!("Error serving connection from {}: {:?}", peer, err);
            }
        });
    }
}
