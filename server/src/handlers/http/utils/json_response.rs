use std::convert::Infallible;

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Response, StatusCode, header};
use serde::Serialize;
use shared::types::ErrorResponse;
use tracing::{debug, error, warn};

use crate::error::CommandError;
use crate::handlers::http::utils::deliver_page::full;

/// Serialize any `Serialize` type and deliver it as a JSON response.
/// This is the primary helper all handlers should use instead of
/// writing their own one-off serialization + response-building blocks.
pub fn deliver_serialized_json<T: Serialize>(
    data: &T,
    status: StatusCode,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let json = serde_json::to_string(data).context("Failed to serialize response")?;

    debug!("Delivering serialized JSON response, size: {} bytes", json.len());

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(full(json))
        .map_err(|e| anyhow!("Failed to build JSON response: {}", e))
}

/// Delivers a JSON error response with the specified error code, message, and status.
pub fn deliver_error_json(
    error_code: &str,
    message: &str,
    status: StatusCode,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    if status.is_server_error() {
        error!("Delivering error JSON: {} - {} ({})", status.as_u16(), error_code, message);
    } else {
        debug!("Delivering error JSON: {} - {} ({})", status.as_u16(), error_code, message);
    }

    deliver_serialized_json(&ErrorResponse::new(error_code, message), status)
}

/// Map a failed command onto its status code and error envelope.
pub fn deliver_command_error(err: &CommandError) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    if let CommandError::Validation(v) = err {
        warn!("Rejected invalid command: {}", v);
    }
    deliver_error_json(err.to_code(), &err.to_message(), err.status())
}

/// Last-resort 500 for when building the real response itself failed.
pub fn internal_error_response() -> Response<BoxBody<Bytes, Infallible>> {
    let mut response = Response::new(full(
        r#"{"status":"error","code":"INTERNAL_ERROR","message":"Internal server error"}"#,
    ));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    response
}
