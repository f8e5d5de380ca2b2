//! Product catalog route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crowe_logic_core::{HealthBenefit, ProductId};

use super::parse_id;
use crate::error::{ApiJson, AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product, ProductPatch, ProductWithIngredients};
use crate::state::AppState;

const INVALID_ID: &str = "Invalid product ID";
const NOT_FOUND: &str = "Product not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/{id}", get(show).put(update).delete(destroy))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub health_benefit: Option<String>,
}

/// List products with their composition.
///
/// An unknown `healthBenefit` is treated like no filter.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductWithIngredients>>> {
    let benefit = query
        .health_benefit
        .as_deref()
        .and_then(|raw| raw.parse::<HealthBenefit>().ok());

    let products = state.storage().list_products_with_ingredients(benefit).await?;
    Ok(Json(products))
}

/// Show one product with its composition.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductWithIngredients>> {
    let id: ProductId = parse_id(&id, INVALID_ID)?;
    state
        .storage()
        .get_product_with_ingredients(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

#[instrument(skip(state, admin, body), fields(admin = %admin.username, sku = %body.sku))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    body.validate()?;
    let product = state.storage().create_product(body).await?;
    state.catalog_changed().await;

    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, admin, body), fields(admin = %admin.username))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ProductPatch>,
) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id, INVALID_ID)?;
    body.validate()?;

    let product = state
        .storage()
        .update_product(id, body)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
    state.catalog_changed().await;

    Ok(Json(product))
}

#[instrument(skip(state, admin), fields(admin = %admin.username))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id: ProductId = parse_id(&id, INVALID_ID)?;

    if !state.storage().delete_product(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }
    state.catalog_changed().await;

    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
