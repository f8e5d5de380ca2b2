//! Production batch domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crowe_logic_core::date::{flexible, flexible_opt};
use crowe_logic_core::{
    BatchCode, BatchId, BatchIngredientId, IngredientId, ProductId, ValidationErrors,
};

use super::catalog::{Ingredient, Product};
use super::document::ResearchDocument;

/// A production run of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: BatchId,
    pub batch_code: BatchCode,
    pub product_id: ProductId,
    pub production_date: DateTime<Utc>,
    pub alcohol_percentage: Option<i32>,
    pub organic_certification: Option<String>,
    pub notes: Option<String>,
}

/// Input for creating a batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBatch {
    pub batch_code: BatchCode,
    pub product_id: ProductId,
    #[serde(deserialize_with = "flexible")]
    pub production_date: DateTime<Utc>,
    #[serde(default)]
    pub alcohol_percentage: Option<i32>,
    #[serde(default)]
    pub organic_certification: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewBatch {
    /// # Errors
    ///
    /// Returns an error when the alcohol percentage is out of range.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(alcohol) = self.alcohol_percentage {
            errors.check_percentage("alcoholPercentage", alcohol);
        }
        errors.into_result()
    }
}

/// Partial update for a batch. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPatch {
    pub batch_code: Option<BatchCode>,
    pub product_id: Option<ProductId>,
    #[serde(default, deserialize_with = "flexible_opt")]
    pub production_date: Option<DateTime<Utc>>,
    pub alcohol_percentage: Option<i32>,
    pub organic_certification: Option<String>,
    pub notes: Option<String>,
}

impl BatchPatch {
    /// # Errors
    ///
    /// Returns an error when a supplied alcohol percentage is out of range.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(alcohol) = self.alcohol_percentage {
            errors.check_percentage("alcoholPercentage", alcohol);
        }
        errors.into_result()
    }

    pub fn apply(self, batch: &mut Batch) {
        if let Some(code) = self.batch_code {
            batch.batch_code = code;
        }
        if let Some(product_id) = self.product_id {
            batch.product_id = product_id;
        }
        if let Some(date) = self.production_date {
            batch.production_date = date;
        }
        if self.alcohol_percentage.is_some() {
            batch.alcohol_percentage = self.alcohol_percentage;
        }
        if self.organic_certification.is_some() {
            batch.organic_certification = self.organic_certification;
        }
        if self.notes.is_some() {
            batch.notes = self.notes;
        }
    }
}

/// Ingredient provenance recorded for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchIngredient {
    pub id: BatchIngredientId,
    pub batch_id: BatchId,
    pub ingredient_id: IngredientId,
    pub percentage: i32,
    pub extract_type: String,
    /// Herb-to-menstruum ratio such as `1:4`.
    pub extraction_ratio: Option<String>,
    pub harvest_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBatchIngredient {
    pub batch_id: BatchId,
    pub ingredient_id: IngredientId,
    pub percentage: i32,
    pub extract_type: String,
    #[serde(default)]
    pub extraction_ratio: Option<String>,
    #[serde(default, deserialize_with = "flexible_opt")]
    pub harvest_date: Option<DateTime<Utc>>,
}

impl NewBatchIngredient {
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_percentage("percentage", self.percentage);
        errors.require_non_empty("extractType", &self.extract_type);
        if let Some(ratio) = &self.extraction_ratio
            && !is_ratio(ratio)
        {
            errors.add("extractionRatio", "must look like 1:4");
        }
        errors.into_result()
    }
}

/// `N:M` with positive integers on both sides.
fn is_ratio(value: &str) -> bool {
    value.split_once(':').is_some_and(|(left, right)| {
        [left, right]
            .iter()
            .all(|part| part.trim().parse::<u32>().is_ok_and(|n| n > 0))
    })
}

/// A batch ingredient joined with the ingredient it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchIngredientDetail {
    #[serde(flatten)]
    pub row: BatchIngredient,
    pub ingredient: Ingredient,
}

/// Everything the public batch transparency page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWithDetails {
    #[serde(flatten)]
    pub batch: Batch,
    pub product: Product,
    pub ingredients: Vec<BatchIngredientDetail>,
    pub documents: Vec<ResearchDocument>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_new_batch_accepts_bare_date_and_lowercase_code() {
        let batch: NewBatch = serde_json::from_str(
            r#"{"batchCode":"clf003-2401","productId":3,"productionDate":"2024-01-09","alcoholPercentage":30}"#,
        )
        .unwrap();
        assert_eq!(batch.batch_code.as_str(), "CLF003-2401");
        assert_eq!(batch.production_date.year(), 2024);
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_new_batch_rejects_short_code() {
        let result = serde_json::from_str::<NewBatch>(
            r#"{"batchCode":"CL1","productId":1,"productionDate":"2024-01-09"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_alcohol_out_of_range() {
        let patch = BatchPatch {
            alcohol_percentage: Some(120),
            ..Default::default()
        };
        let errors = patch.validate().unwrap_err();
        assert_eq!(errors.errors()[0].field, "alcoholPercentage");
    }

    #[test]
    fn test_extraction_ratio_format() {
        assert!(is_ratio("1:4"));
        assert!(is_ratio("10 : 1"));
        assert!(!is_ratio("1-4"));
        assert!(!is_ratio("0:4"));
        assert!(!is_ratio("1:"));
    }

    #[test]
    fn test_batch_ingredient_requires_extract_type() {
        let row: NewBatchIngredient = serde_json::from_str(
            r#"{"batchId":1,"ingredientId":2,"percentage":20,"extractType":"","extractionRatio":"1:4"}"#,
        )
        .unwrap();
        let errors = row.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "extractType");
    }

    #[test]
    fn test_patch_keeps_unsupplied_fields() {
        let mut batch = Batch {
            id: BatchId::new(1),
            batch_code: BatchCode::parse("CLF001-2304").unwrap(),
            product_id: ProductId::new(1),
            production_date: crowe_logic_core::date::parse_flexible("2023-04-15").unwrap(),
            alcohol_percentage: Some(30),
            organic_certification: Some("USDA Organic".to_string()),
            notes: None,
        };
        let patch: BatchPatch = serde_json::from_str(r#"{"notes":"Re-bottled"}"#).unwrap();
        patch.apply(&mut batch);
        assert_eq!(batch.notes.as_deref(), Some("Re-bottled"));
        assert_eq!(batch.alcohol_percentage, Some(30));
        assert_eq!(batch.batch_code.as_str(), "CLF001-2304");
    }
}
