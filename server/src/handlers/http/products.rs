use std::convert::Infallible;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, combinators::BoxBody};
use hyper::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use shared::types::{AddProductData, EditProductData, Remove, SaveScanData, UpdateStockData};
use tracing::{info, warn};

use crate::AppState;
use crate::error::CommandError;
use crate::handlers::http::routes::path_segment;
use crate::handlers::http::utils::{
    deliver_command_error, deliver_error_json, deliver_serialized_json,
};

type HttpResponse = Response<BoxBody<Bytes, Infallible>>;

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Collect the body and parse it as JSON. An empty body parses as `T::default()`
/// so that missing fields surface as validation errors.
async fn read_json<T: DeserializeOwned + Default>(
    req: Request<hyper::body::Incoming>,
) -> Result<std::result::Result<T, serde_json::Error>> {
    let body = req
        .collect()
        .await
        .context("Failed to read request body")?
        .to_bytes();

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Ok(T::default()));
    }
    Ok(serde_json::from_slice(&body))
}

fn invalid_json(err: &serde_json::Error) -> Result<HttpResponse> {
    warn!("Rejected malformed JSON body: {}", err);
    deliver_error_json(
        "INVALID_JSON",
        "Request body must be a JSON object",
        StatusCode::BAD_REQUEST,
    )
}

/// The `:id` segment of `/<command>/:id`.
fn id_param(req: &Request<hyper::body::Incoming>) -> String {
    path_segment(req, 2).unwrap_or_default()
}

fn command_failed(err: CommandError) -> Result<HttpResponse> {
    deliver_command_error(&err)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /products: The full list, in insertion order.
pub async fn handle_list(
    _req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<HttpResponse> {
    match state.processor.list().await {
        Ok(products) => deliver_serialized_json(&products, StatusCode::OK),
        Err(e) => deliver_error_json(
            e.to_code(),
            "Failed to fetch products",
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}

/// POST /add-product: Add stock to an existing id or create the product.
///
/// Body: `{"id": "...", "name": "...", "stock": <int ≥ 0>}`
pub async fn handle_add_product(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<HttpResponse> {
    let data: AddProductData = match read_json(req).await? {
        Ok(data) => data,
        Err(e) => return invalid_json(&e),
    };
    let cmd = match data.validate() {
        Ok(cmd) => cmd,
        Err(e) => return command_failed(e.into()),
    };

    info!("Add product {} (+{})", cmd.id, cmd.stock);
    match state.processor.add_or_accumulate(cmd).await {
        Ok(products) => deliver_serialized_json(
            &json!({ "message": "Product saved successfully!", "products": products }),
            StatusCode::OK,
        ),
        Err(e) => command_failed(e),
    }
}

/// PUT /update-product/:id: Overwrite the stock count.
///
/// Body: `{"stock": <int ≥ 0>}`
pub async fn handle_update_stock(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<HttpResponse> {
    let id = id_param(&req);
    let data: UpdateStockData = match read_json(req).await? {
        Ok(data) => data,
        Err(e) => return invalid_json(&e),
    };
    let cmd = match data.validate(&id) {
        Ok(cmd) => cmd,
        Err(e) => return command_failed(e.into()),
    };

    info!("Set stock of {} to {}", cmd.id, cmd.stock);
    match state.processor.set_stock(cmd).await {
        Ok(products) => deliver_serialized_json(
            &json!({ "message": "Product updated successfully!", "products": products }),
            StatusCode::OK,
        ),
        Err(e) => command_failed(e),
    }
}

/// PUT /edit-product/:id: Replace name and stock.
///
/// Body: `{"name": "...", "stock": <int ≥ 0>}`
pub async fn handle_edit_product(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<HttpResponse> {
    let id = id_param(&req);
    let data: EditProductData = match read_json(req).await? {
        Ok(data) => data,
        Err(e) => return invalid_json(&e),
    };
    let cmd = match data.validate(&id) {
        Ok(cmd) => cmd,
        Err(e) => return command_failed(e.into()),
    };

    info!("Edit product {}", cmd.id);
    match state.processor.edit_record(cmd).await {
        Ok((product, products)) => deliver_serialized_json(
            &json!({
                "message":  "Product edited successfully!",
                "product":  product,
                "products": products,
            }),
            StatusCode::OK,
        ),
        Err(e) => command_failed(e),
    }
}

/// DELETE /delete-product/:id
pub async fn handle_delete_product(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<HttpResponse> {
    let cmd = match Remove::from_path(&id_param(&req)) {
        Ok(cmd) => cmd,
        Err(e) => return command_failed(e.into()),
    };

    info!("Delete product {}", cmd.id);
    match state.processor.remove(cmd).await {
        Ok(_) => deliver_serialized_json(
            &json!({ "message": "Product deleted successfully!" }),
            StatusCode::OK,
        ),
        Err(e) => command_failed(e),
    }
}

/// POST /save-scan: One scanner read of a barcode.
///
/// Body: `{"id": "...", "name": "..."?}`; `name` is only needed for ids
/// that are not in the list yet.
pub async fn handle_save_scan(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<HttpResponse> {
    let data: SaveScanData = match read_json(req).await? {
        Ok(data) => data,
        Err(e) => return invalid_json(&e),
    };
    let cmd = match data.validate() {
        Ok(cmd) => cmd,
        Err(e) => return command_failed(e.into()),
    };

    match state.processor.record_scan(cmd).await {
        Ok(outcome) => {
            info!(
                "Scan saved for {} (stock {}{})",
                outcome.product.id,
                outcome.product.stock,
                if outcome.is_new { ", new" } else { "" }
            );
            deliver_serialized_json(
                &json!({ "message": "Scan saved", "product": outcome.product }),
                StatusCode::OK,
            )
        }
        Err(e) => command_failed(e),
    }
}
