use std::convert::Infallible;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use http_body_util::combinators::BoxBody;
use hyper::header::{
    CONNECTION, HeaderName, SEC_WEBSOCKET_ACCEPT, SEC_WEBSOCKET_KEY, SEC_WEBSOCKET_VERSION,
    UPGRADE,
};
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::handshake::derive_accept_key;
use tokio_tungstenite::tungstenite::protocol::{Message, Role};
use tracing::{debug, info, warn};

use crate::handlers::http::utils::{deliver_error_json, empty};
use crate::handlers::hub::{Listener, NotificationHub};

/// True when `header` lists `token` (comma separated, case-insensitive).
fn header_has_token<B>(req: &Request<B>, header: HeaderName, token: &str) -> bool {
    req.headers()
        .get_all(header)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|v| v.trim().eq_ignore_ascii_case(token))
}

/// Check if a request asks to switch to the WebSocket protocol
pub fn is_websocket_upgrade<B>(req: &Request<B>) -> bool {
    header_has_token(req, UPGRADE, "websocket") && header_has_token(req, CONNECTION, "upgrade")
}

/// Accept the handshake and hand the upgraded connection to a listener task.
///
/// Any path is accepted; every listener receives the same feed. The listener
/// is registered before the 101 goes out, so a client that has finished its
/// handshake sees every event committed after that point.
pub async fn handle_websocket_upgrade(
    mut req: Request<hyper::body::Incoming>,
    hub: Arc<NotificationHub>,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let version_ok = req
        .headers()
        .get(SEC_WEBSOCKET_VERSION)
        .is_some_and(|v| v.as_bytes() == b"13");
    let Some(key) = req.headers().get(SEC_WEBSOCKET_KEY).cloned() else {
        return deliver_error_json(
            "BAD_HANDSHAKE",
            "Missing Sec-WebSocket-Key header",
            StatusCode::BAD_REQUEST,
        );
    };
    if !version_ok {
        return deliver_error_json(
            "BAD_HANDSHAKE",
            "Unsupported WebSocket version",
            StatusCode::BAD_REQUEST,
        );
    }

    let accept = derive_accept_key(key.as_bytes());
    let listener = hub.subscribe().await;

    tokio::task::spawn(async move {
        match hyper::upgrade::on(&mut req).await {
            Ok(upgraded) => {
                let ws =
                    WebSocketStream::from_raw_socket(TokioIo::new(upgraded), Role::Server, None)
                        .await;
                run_listener(ws, listener, hub).await;
            }
            Err(e) => {
                warn!("WebSocket upgrade error: {}", e);
                hub.unregister(listener.id).await;
            }
        }
    });

    Response::builder()
        .status(StatusCode::SWITCHING_PROTOCOLS)
        .header(UPGRADE, "websocket")
        .header(CONNECTION, "Upgrade")
        .header(SEC_WEBSOCKET_ACCEPT, accept)
        .body(empty())
        .context("Failed to build upgrade response")
}

/// Pump hub frames out to one socket until either side goes away.
async fn run_listener<S>(ws: WebSocketStream<S>, listener: Listener, hub: Arc<NotificationHub>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let Listener { id, mut rx } = listener;
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            frame = rx.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = sink.send(Message::Text(frame.to_string())).await {
                        debug!("Listener {} send failed: {}", id, e);
                        break;
                    }
                }
                None => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    debug!("Message received from listener {}: {}", id, text);
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("Listener {} read failed: {}", id, e);
                    break;
                }
            },
        }
    }

    hub.unregister(id).await;
    info!("Listener {} disconnected", id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn detects_upgrade_with_mixed_case_and_lists() {
        let req = request(&[("upgrade", "WebSocket"), ("connection", "keep-alive, Upgrade")]);
        assert!(is_websocket_upgrade(&req));
    }

    #[test]
    fn plain_requests_are_not_upgrades() {
        assert!(!is_websocket_upgrade(&request(&[])));
        assert!(!is_websocket_upgrade(&request(&[("upgrade", "websocket")])));
        assert!(!is_websocket_upgrade(&request(&[
            ("upgrade", "h2c"),
            ("connection", "upgrade")
        ])));
    }
}
