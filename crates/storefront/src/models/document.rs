//! Research documents and certificates.

use serde::{Deserialize, Serialize};
use url::Url;

use crowe_logic_core::{
    BatchId, DocumentId, DocumentType, IngredientId, ProductId, ValidationErrors,
};

/// A study, lab result or certificate, optionally linked to a product,
/// ingredient or batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchDocument {
    pub id: DocumentId,
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub ingredient_id: Option<IngredientId>,
    pub product_id: Option<ProductId>,
    pub batch_id: Option<BatchId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResearchDocument {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default)]
    pub ingredient_id: Option<IngredientId>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub batch_id: Option<BatchId>,
}

impl NewResearchDocument {
    /// # Errors
    ///
    /// Returns every invalid field; `url` must be absolute.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_empty("title", &self.title);
        if Url::parse(&self.url).is_err() {
            errors.add("url", "must be an absolute URL");
        }
        errors.into_result()
    }
}
