//! Batch transparency route handlers.
//!
//! The lookup by code is public and is what printed QR codes resolve to.
//! Everything else is admin-only.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use tracing::instrument;

use crowe_logic_core::{BatchCode, BatchId, ProductId};

use super::{parse_id, query_value};
use crate::error::{ApiJson, AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::models::{Batch, BatchIngredient, BatchPatch, NewBatch, NewBatchIngredient};
use crate::state::AppState;

const INVALID_ID: &str = "Invalid batch ID";
const NOT_FOUND: &str = "Batch not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/batches", get(index).post(create))
        .route("/batches/code/{batch_code}", get(show_by_code))
        .route("/batches/{id}", put(update).delete(destroy))
        .route("/batch-ingredients", post(add_ingredient))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQuery {
    pub product_id: Option<String>,
}

pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> Result<Json<Vec<Batch>>> {
    let storage = state.storage();
    let batches = match query_value(query.product_id.as_deref()) {
        Some(raw) => {
            let product_id: ProductId = parse_id(raw, "Invalid product ID")?;
            storage.list_batches_by_product(product_id).await?
        }
        None => storage.list_batches().await?,
    };
    Ok(Json(batches))
}

/// Public batch page data: batch, product, ingredient provenance and lab
/// documents. Codes are matched case-insensitively.
#[instrument(skip(state))]
pub async fn show_by_code(
    State(state): State<AppState>,
    Path(batch_code): Path<String>,
) -> Result<Response> {
    let code = BatchCode::parse(&batch_code).map_err(|e| AppError::BadRequest(e.to_string()))?;

    add_breadcrumb("batch", "Batch lookup", Some(&[("batch_code", code.as_str())]));

    let details = state
        .batches()
        .get(state.storage(), &code)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    Ok(Json(details.as_ref()).into_response())
}

#[instrument(
    skip(state, admin, body),
    fields(admin = %admin.username, batch_code = %body.batch_code)
)]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewBatch>,
) -> Result<(StatusCode, Json<Batch>)> {
    body.validate()?;
    let batch = state.storage().create_batch(body).await?;
    state.catalog_changed().await;

    tracing::info!(batch_id = %batch.id, "Batch created");
    Ok((StatusCode::CREATED, Json(batch)))
}

pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<BatchPatch>,
) -> Result<Json<Batch>> {
    let id: BatchId = parse_id(&id, INVALID_ID)?;
    body.validate()?;

    let batch = state
        .storage()
        .update_batch(id, body)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
    state.catalog_changed().await;

    Ok(Json(batch))
}

#[instrument(skip(state, admin), fields(admin = %admin.username))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id: BatchId = parse_id(&id, INVALID_ID)?;

    if !state.storage().delete_batch(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }
    state.catalog_changed().await;

    tracing::info!(batch_id = %id, "Batch deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_ingredient(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewBatchIngredient>,
) -> Result<(StatusCode, Json<BatchIngredient>)> {
    body.validate()?;
    let row = state.storage().add_ingredient_to_batch(body).await?;
    state.catalog_changed().await;

    Ok((StatusCode::CREATED, Json(row)))
}
