//! Catalog export route handlers (admin).

use axum::{
    Json, Router,
    extract::State,
    http::{
        HeaderValue,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::export::{
    self, QrTarget, ShopifyProduct, csv_filename, products_csv, qr_csv, qr_targets,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export/shopify", get(shopify))
        .route("/export/qr-codes", get(qr_codes))
        .route("/export/qr-codes.csv", get(qr_codes_csv))
        .route("/export/products.csv", get(products_csv_download))
}

/// Shopify product import records for the whole catalog.
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn shopify(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ShopifyProduct>>> {
    let products = state.storage().list_products_with_ingredients(None).await?;

    let records = products
        .iter()
        .map(export::shopify_product)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(format!("Failed to encode metafield: {e}")))?;

    tracing::info!(count = records.len(), "Shopify export generated");
    Ok(Json(records))
}

pub async fn qr_codes(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<QrTarget>>> {
    let batches = state.storage().list_batches().await?;
    Ok(Json(qr_targets(&batches, state.config())))
}

pub async fn qr_codes_csv(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Response> {
    let batches = state.storage().list_batches().await?;
    let body = qr_csv(&qr_targets(&batches, state.config()));
    csv_response("qr-codes", body)
}

pub async fn products_csv_download(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Response> {
    let products = state.storage().list_products().await?;
    csv_response("products", products_csv(&products))
}

fn csv_response(kind: &str, body: String) -> Result<Response> {
    let filename = csv_filename(kind, chrono::Utc::now().date_naive());
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {e}")))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
