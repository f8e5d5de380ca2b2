//! Product and ingredient domain types.
//!
//! These types double as the JSON bodies of the catalog API; field names
//! are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crowe_logic_core::{
    HealthBenefit, IngredientId, ProductId, ProductIngredientId, ProductStatus, Sku,
    ValidationErrors,
};

/// Longest product or ingredient name accepted from the admin forms.
pub const MAX_NAME_LENGTH: usize = 200;

/// A tincture in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub sku: Sku,
    pub health_benefit: HealthBenefit,
    /// Image URL or path under `/images`.
    pub image: Option<String>,
    pub status: ProductStatus,
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub sku: Sku,
    pub health_benefit: HealthBenefit,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
}

impl NewProduct {
    /// Check free-text fields that the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_empty("name", &self.name);
        errors.check_max_len("name", &self.name, MAX_NAME_LENGTH);
        errors.require_non_empty("description", &self.description);
        errors.into_result()
    }
}

/// Partial update for a product. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<Sku>,
    pub health_benefit: Option<HealthBenefit>,
    pub image: Option<String>,
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    /// # Errors
    ///
    /// Returns every supplied field that is blank or too long.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.require_non_empty("name", name);
            errors.check_max_len("name", name, MAX_NAME_LENGTH);
        }
        if let Some(description) = &self.description {
            errors.require_non_empty("description", description);
        }
        errors.into_result()
    }

    /// Apply the supplied fields to `product`.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(health_benefit) = self.health_benefit {
            product.health_benefit = health_benefit;
        }
        if let Some(image) = self.image {
            product.image = Some(image);
        }
        if let Some(status) = self.status {
            product.status = status;
        }
    }
}

/// A mushroom or carrier used in formulations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
}

impl Ingredient {
    /// Stand-in for a join row whose ingredient no longer exists.
    #[must_use]
    pub fn unknown(id: IngredientId) -> Self {
        Self {
            id,
            name: "Unknown ingredient".to_string(),
            scientific_name: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIngredient {
    pub name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewIngredient {
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_empty("name", &self.name);
        errors.check_max_len("name", &self.name, MAX_NAME_LENGTH);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPatch {
    pub name: Option<String>,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
}

impl IngredientPatch {
    /// # Errors
    ///
    /// Returns an error when a supplied name is blank or too long.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.require_non_empty("name", name);
            errors.check_max_len("name", name, MAX_NAME_LENGTH);
        }
        errors.into_result()
    }

    pub fn apply(self, ingredient: &mut Ingredient) {
        if let Some(name) = self.name {
            ingredient.name = name;
        }
        if self.scientific_name.is_some() {
            ingredient.scientific_name = self.scientific_name;
        }
        if self.description.is_some() {
            ingredient.description = self.description;
        }
    }
}

/// How much of an ingredient a product's formulation contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIngredient {
    pub id: ProductIngredientId,
    pub product_id: ProductId,
    pub ingredient_id: IngredientId,
    /// Share of the formulation, `0..=100`.
    pub percentage: i32,
    pub extract_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductIngredient {
    pub product_id: ProductId,
    pub ingredient_id: IngredientId,
    pub percentage: i32,
    #[serde(default)]
    pub extract_type: Option<String>,
}

impl NewProductIngredient {
    /// # Errors
    ///
    /// Returns an error when the percentage is out of range.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_percentage("percentage", self.percentage);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIngredientPatch {
    pub product_id: Option<ProductId>,
    pub ingredient_id: Option<IngredientId>,
    pub percentage: Option<i32>,
    pub extract_type: Option<String>,
}

impl ProductIngredientPatch {
    /// # Errors
    ///
    /// Returns an error when a supplied percentage is out of range.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(percentage) = self.percentage {
            errors.check_percentage("percentage", percentage);
        }
        errors.into_result()
    }

    pub fn apply(self, row: &mut ProductIngredient) {
        if let Some(product_id) = self.product_id {
            row.product_id = product_id;
        }
        if let Some(ingredient_id) = self.ingredient_id {
            row.ingredient_id = ingredient_id;
        }
        if let Some(percentage) = self.percentage {
            row.percentage = percentage;
        }
        if self.extract_type.is_some() {
            row.extract_type = self.extract_type;
        }
    }
}

/// A composition row joined with its ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIngredientDetail {
    #[serde(flatten)]
    pub row: ProductIngredient,
    pub ingredient: Ingredient,
}

/// A product with its full composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithIngredients {
    #[serde(flatten)]
    pub product: Product,
    pub ingredients: Vec<ProductIngredientDetail>,
}
