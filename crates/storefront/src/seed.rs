//! Sample catalog and bootstrap admin.
//!
//! The catalog is a YAML document (see `seed/catalog.yaml`) loaded through the
//! [`Storage`] trait, so the same file seeds the in-memory store at startup
//! and PostgreSQL via `cl-cli seed catalog`. Loading is idempotent: entries
//! whose SKU, batch code, ingredient name or document URL already exist are
//! skipped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crowe_logic_core::date::{flexible, flexible_opt};
use crowe_logic_core::{
    BatchCode, BatchId, DocumentType, HealthBenefit, IngredientId, ProductId, ProductStatus, Sku,
    ValidationErrors,
};

use crate::config::generate_admin_password;
use crate::db::{RepositoryError, Storage};
use crate::models::{
    NewBatch, NewBatchIngredient, NewIngredient, NewProduct, NewProductIngredient,
    NewResearchDocument, ProductPatch,
};
use crate::services::auth::{AuthError, AuthService};

/// The brand catalog shipped with the binary.
const BUILTIN_CATALOG: &str = include_str!("../seed/catalog.yaml");

/// Username of the bootstrap administrator.
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("{what} references unknown ingredient '{name}'")]
    UnknownIngredient { what: String, name: String },

    #[error("{what} references unknown product '{sku}'")]
    UnknownProduct { what: String, sku: Sku },

    #[error("{what} is invalid: {errors}")]
    Invalid {
        what: String,
        errors: ValidationErrors,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct IngredientEntry {
    name: String,
    #[serde(default)]
    scientific_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CompositionEntry {
    ingredient: String,
    percentage: i32,
    #[serde(default)]
    extract_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProductEntry {
    name: String,
    sku: Sku,
    description: String,
    health_benefit: HealthBenefit,
    #[serde(default)]
    status: ProductStatus,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    ingredients: Vec<CompositionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchIngredientEntry {
    ingredient: String,
    percentage: i32,
    extract_type: String,
    #[serde(default)]
    extraction_ratio: Option<String>,
    #[serde(default, deserialize_with = "flexible_opt")]
    harvest_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchDocumentEntry {
    title: String,
    url: String,
    #[serde(rename = "type")]
    doc_type: DocumentType,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchEntry {
    batch_code: BatchCode,
    product: Sku,
    #[serde(deserialize_with = "flexible")]
    production_date: DateTime<Utc>,
    #[serde(default)]
    alcohol_percentage: Option<i32>,
    #[serde(default)]
    organic_certification: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    ingredients: Vec<BatchIngredientEntry>,
    #[serde(default)]
    documents: Vec<BatchDocumentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct StudyEntry {
    title: String,
    url: String,
    #[serde(default)]
    product: Option<Sku>,
    #[serde(default)]
    ingredient: Option<String>,
}

/// A catalog document: ingredients, products with composition, batches with
/// provenance and certificates, and supporting studies.
#[derive(Debug, Clone, Deserialize)]
pub struct SampleCatalog {
    #[serde(default)]
    ingredients: Vec<IngredientEntry>,
    #[serde(default)]
    products: Vec<ProductEntry>,
    #[serde(default)]
    batches: Vec<BatchEntry>,
    #[serde(default)]
    studies: Vec<StudyEntry>,
}

/// Counts of rows created by [`SampleCatalog::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub ingredients: usize,
    pub products: usize,
    pub batches: usize,
    pub documents: usize,
    pub skipped: usize,
}

impl SampleCatalog {
    /// The catalog embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the embedded file does not parse.
    pub fn builtin() -> Result<Self, SeedError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` on malformed input.
    pub fn from_yaml(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Insert every entry that is not already present.
    ///
    /// # Errors
    ///
    /// Returns an error when an entry is invalid, references an unknown
    /// product or ingredient, or storage fails. A product or batch is only
    /// created once all of its rows check out, so entries inserted before the
    /// failure are complete and re-running after a fix picks up where it left
    /// off.
    #[instrument(skip_all, fields(backend = storage.backend()))]
    pub async fn load(&self, storage: &dyn Storage) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();

        let mut ingredients: HashMap<String, IngredientId> = storage
            .list_ingredients()
            .await?
            .into_iter()
            .map(|ingredient| (ingredient.name, ingredient.id))
            .collect();

        for entry in &self.ingredients {
            if ingredients.contains_key(&entry.name) {
                report.skipped += 1;
                continue;
            }
            let new = NewIngredient {
                name: entry.name.clone(),
                scientific_name: entry.scientific_name.clone(),
                description: entry.description.clone(),
            };
            check(format!("ingredient '{}'", entry.name), new.validate())?;
            let created = storage.create_ingredient(new).await?;
            ingredients.insert(created.name, created.id);
            report.ingredients += 1;
        }

        let lookup_ingredient = |what: &str, name: &str| {
            ingredients
                .get(name)
                .copied()
                .ok_or_else(|| SeedError::UnknownIngredient {
                    what: what.to_owned(),
                    name: name.to_owned(),
                })
        };

        let mut products: HashMap<Sku, ProductId> = HashMap::new();
        for entry in &self.products {
            if let Some(existing) = storage.get_product_by_sku(&entry.sku).await? {
                products.insert(existing.sku, existing.id);
                report.skipped += 1;
                continue;
            }
            let what = format!("product {}", entry.sku);
            let new = NewProduct {
                name: entry.name.clone(),
                description: normalize_whitespace(&entry.description),
                sku: entry.sku.clone(),
                health_benefit: entry.health_benefit,
                image: entry.image.clone(),
                status: entry.status,
            };
            check(what.clone(), new.validate())?;

            // Children are checked before the product exists so a bad row
            // never leaves a product that later runs would skip.
            let mut composition = Vec::with_capacity(entry.ingredients.len());
            for row in &entry.ingredients {
                let new = NewProductIngredient {
                    product_id: ProductId::new(0),
                    ingredient_id: lookup_ingredient(&what, &row.ingredient)?,
                    percentage: row.percentage,
                    extract_type: row.extract_type.clone(),
                };
                check(what.clone(), new.validate())?;
                composition.push(new);
            }

            let product = storage.create_product(new).await?;
            for mut new in composition {
                new.product_id = product.id;
                storage.add_ingredient_to_product(new).await?;
            }

            products.insert(product.sku, product.id);
            report.products += 1;
        }

        let mut known_urls: Vec<String> = storage
            .list_documents()
            .await?
            .into_iter()
            .map(|document| document.url)
            .collect();

        for entry in &self.batches {
            if storage.get_batch_by_code(&entry.batch_code).await?.is_some() {
                report.skipped += 1;
                continue;
            }
            let what = format!("batch {}", entry.batch_code);
            let new = NewBatch {
                batch_code: entry.batch_code.clone(),
                product_id: resolve_product(storage, &products, &what, &entry.product).await?,
                production_date: entry.production_date,
                alcohol_percentage: entry.alcohol_percentage,
                organic_certification: entry.organic_certification.clone(),
                notes: entry.notes.clone(),
            };
            check(what.clone(), new.validate())?;

            let mut rows = Vec::with_capacity(entry.ingredients.len());
            for row in &entry.ingredients {
                let new = NewBatchIngredient {
                    batch_id: BatchId::new(0),
                    ingredient_id: lookup_ingredient(&what, &row.ingredient)?,
                    percentage: row.percentage,
                    extract_type: row.extract_type.clone(),
                    extraction_ratio: row.extraction_ratio.clone(),
                    harvest_date: row.harvest_date,
                };
                check(what.clone(), new.validate())?;
                rows.push(new);
            }

            let mut documents = Vec::with_capacity(entry.documents.len());
            for document in &entry.documents {
                if known_urls.contains(&document.url) {
                    report.skipped += 1;
                    continue;
                }
                let new = NewResearchDocument {
                    title: document.title.clone(),
                    url: document.url.clone(),
                    doc_type: document.doc_type,
                    ingredient_id: None,
                    product_id: None,
                    batch_id: None,
                };
                check(format!("document '{}'", document.title), new.validate())?;
                documents.push(new);
            }

            let batch = storage.create_batch(new).await?;
            for mut new in rows {
                new.batch_id = batch.id;
                storage.add_ingredient_to_batch(new).await?;
            }
            for mut new in documents {
                new.batch_id = Some(batch.id);
                known_urls.push(new.url.clone());
                storage.create_document(new).await?;
                report.documents += 1;
            }

            report.batches += 1;
        }

        for study in &self.studies {
            if known_urls.contains(&study.url) {
                report.skipped += 1;
                continue;
            }
            let what = format!("study '{}'", study.title);
            let product_id = match &study.product {
                Some(sku) => Some(resolve_product(storage, &products, &what, sku).await?),
                None => None,
            };
            let ingredient_id = study
                .ingredient
                .as_deref()
                .map(|name| lookup_ingredient(&what, name))
                .transpose()?;
            let new = NewResearchDocument {
                title: study.title.clone(),
                url: study.url.clone(),
                doc_type: DocumentType::ScientificStudy,
                ingredient_id,
                product_id,
                batch_id: None,
            };
            check(what, new.validate())?;
            storage.create_document(new).await?;
            known_urls.push(study.url.clone());
            report.documents += 1;
        }

        tracing::info!(
            ingredients = report.ingredients,
            products = report.products,
            batches = report.batches,
            documents = report.documents,
            skipped = report.skipped,
            "Catalog loaded"
        );
        Ok(report)
    }

    /// Overwrite the description of every product whose SKU is in the
    /// catalog. Returns the number of products updated.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Repository` if storage fails.
    #[instrument(skip_all, fields(backend = storage.backend()))]
    pub async fn refresh_descriptions(&self, storage: &dyn Storage) -> Result<usize, SeedError> {
        let mut updated = 0;
        for entry in &self.products {
            let Some(product) = storage.get_product_by_sku(&entry.sku).await? else {
                tracing::warn!(sku = %entry.sku, "No product with this SKU, skipping");
                continue;
            };
            let patch = ProductPatch {
                description: Some(normalize_whitespace(&entry.description)),
                ..Default::default()
            };
            if storage.update_product(product.id, patch).await?.is_some() {
                updated += 1;
            }
        }
        tracing::info!(updated, "Product descriptions refreshed");
        Ok(updated)
    }
}

/// Products created by this load first, then anything already in storage.
async fn resolve_product(
    storage: &dyn Storage,
    loaded: &HashMap<Sku, ProductId>,
    what: &str,
    sku: &Sku,
) -> Result<ProductId, SeedError> {
    if let Some(id) = loaded.get(sku) {
        return Ok(*id);
    }
    storage
        .get_product_by_sku(sku)
        .await?
        .map(|product| product.id)
        .ok_or_else(|| SeedError::UnknownProduct {
            what: what.to_owned(),
            sku: sku.clone(),
        })
}

fn check(what: String, result: Result<(), ValidationErrors>) -> Result<(), SeedError> {
    result.map_err(|errors| SeedError::Invalid { what, errors })
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Make sure an administrator exists.
///
/// When no user named [`BOOTSTRAP_ADMIN_USERNAME`] exists, one is created
/// with `password`, or with a freshly generated password that is returned so
/// the caller can show it once.
///
/// # Errors
///
/// Returns an `AuthError` if the lookup or registration fails.
pub async fn ensure_admin(
    storage: &dyn Storage,
    password: Option<&SecretString>,
) -> Result<Option<SecretString>, AuthError> {
    if storage
        .get_user_by_username(BOOTSTRAP_ADMIN_USERNAME)
        .await?
        .is_some()
    {
        return Ok(None);
    }

    let (password, generated) = match password {
        Some(password) => (password.clone(), false),
        None => (generate_admin_password(), true),
    };

    AuthService::new(storage)
        .register(BOOTSTRAP_ADMIN_USERNAME, password.expose_secret(), true)
        .await?;

    Ok(generated.then_some(password))
}
