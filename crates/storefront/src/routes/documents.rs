//! Research document route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use crowe_logic_core::{BatchId, IngredientId, ProductId};

use super::{parse_id, query_value};
use crate::error::{ApiJson, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewResearchDocument, ResearchDocument};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/documents", get(index).post(create))
}

/// Document filters. When several are given, `batchId` wins over
/// `productId`, which wins over `ingredientId`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    pub batch_id: Option<String>,
    pub product_id: Option<String>,
    pub ingredient_id: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Result<Json<Vec<ResearchDocument>>> {
    let storage = state.storage();

    let documents = if let Some(raw) = query_value(query.batch_id.as_deref()) {
        let id: BatchId = parse_id(raw, "Invalid batch ID")?;
        storage.list_documents_by_batch(id).await?
    } else if let Some(raw) = query_value(query.product_id.as_deref()) {
        let id: ProductId = parse_id(raw, "Invalid product ID")?;
        storage.list_documents_by_product(id).await?
    } else if let Some(raw) = query_value(query.ingredient_id.as_deref()) {
        let id: IngredientId = parse_id(raw, "Invalid ingredient ID")?;
        storage.list_documents_by_ingredient(id).await?
    } else {
        storage.list_documents().await?
    };

    Ok(Json(documents))
}

pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewResearchDocument>,
) -> Result<(StatusCode, Json<ResearchDocument>)> {
    body.validate()?;
    let document = state.storage().create_document(body).await?;
    state.catalog_changed().await;

    tracing::info!(
        document_id = %document.id,
        admin = %admin.username,
        doc_type = %document.doc_type,
        "Document created"
    );
    Ok((StatusCode::CREATED, Json(document)))
}
