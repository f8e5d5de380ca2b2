//! Ingredient route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use tracing::instrument;

use crowe_logic_core::IngredientId;

use super::parse_id;
use crate::error::{ApiJson, AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Ingredient, IngredientPatch, NewIngredient};
use crate::state::AppState;

const INVALID_ID: &str = "Invalid ingredient ID";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(index).post(create))
        .route("/ingredients/{id}", put(update))
}

pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Ingredient>>> {
    Ok(Json(state.storage().list_ingredients().await?))
}

#[instrument(skip(state, admin, body), fields(admin = %admin.username, name = %body.name))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewIngredient>,
) -> Result<(StatusCode, Json<Ingredient>)> {
    body.validate()?;
    let ingredient = state.storage().create_ingredient(body).await?;

    tracing::info!(ingredient_id = %ingredient.id, "Ingredient created");
    Ok((StatusCode::CREATED, Json(ingredient)))
}

/// Partial update. Cached batch pages embed ingredient names and are dropped.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<IngredientPatch>,
) -> Result<Json<Ingredient>> {
    let id: IngredientId = parse_id(&id, INVALID_ID)?;
    body.validate()?;

    let ingredient = state
        .storage()
        .update_ingredient(id, body)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient not found".to_string()))?;
    state.catalog_changed().await;

    Ok(Json(ingredient))
}
