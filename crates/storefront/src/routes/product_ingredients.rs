//! Product composition route handlers (admin).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use tracing::instrument;

use crowe_logic_core::ProductIngredientId;

use super::parse_id;
use crate::error::{ApiJson, AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProductIngredient, ProductIngredient, ProductIngredientPatch};
use crate::state::AppState;

const INVALID_ID: &str = "Invalid product ingredient ID";
const NOT_FOUND: &str = "Product ingredient not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product-ingredients", post(create))
        .route("/product-ingredients/{id}", put(update).delete(destroy))
}

#[instrument(
    skip(state, admin, body),
    fields(admin = %admin.username, product_id = %body.product_id)
)]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewProductIngredient>,
) -> Result<(StatusCode, Json<ProductIngredient>)> {
    body.validate()?;
    let row = state.storage().add_ingredient_to_product(body).await?;
    state.catalog_changed().await;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ProductIngredientPatch>,
) -> Result<Json<ProductIngredient>> {
    let id: ProductIngredientId = parse_id(&id, INVALID_ID)?;
    body.validate()?;

    let row = state
        .storage()
        .update_product_ingredient(id, body)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
    state.catalog_changed().await;

    Ok(Json(row))
}

pub async fn destroy(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id: ProductIngredientId = parse_id(&id, INVALID_ID)?;

    if !state.storage().remove_ingredient_from_product(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }
    state.catalog_changed().await;

    Ok(StatusCode::NO_CONTENT)
}
