//! Data access for the storefront.
//!
//! # Backends
//!
//! - [`MemStorage`] - `BTreeMap` tables behind one lock; used for local
//!   development, demos and tests
//! - [`PgStorage`] - `PostgreSQL` via sqlx; used in production
//!
//! Both implement [`Storage`] with identical semantics, including the
//! referential rules:
//!
//! - creating a join row, batch or document that points at a missing parent
//!   fails with [`RepositoryError::InvalidReference`]
//! - deleting a product that still has batches fails with
//!   [`RepositoryError::Conflict`]; otherwise its composition rows go with it
//!   and linked documents lose their `product_id`
//! - deleting a batch removes its ingredient rows and clears `batch_id` on
//!   linked documents
//!
//! # Database: `crowe_logic`
//!
//! ## Tables (schema `storefront`)
//!
//! - `users`, `products`, `ingredients`, `product_ingredients`
//! - `batches`, `batch_ingredients`, `research_documents`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p crowe-logic-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crowe_logic_core::{
    BatchCode, BatchId, HealthBenefit, IngredientId, ProductId, ProductIngredientId, Sku, UserId,
};

use crate::models::{
    Batch, BatchIngredient, BatchIngredientDetail, BatchPatch, BatchWithDetails, Ingredient,
    IngredientPatch, NewBatch, NewBatchIngredient, NewIngredient, NewProduct,
    NewProductIngredient, NewResearchDocument, NewUser, Product, ProductIngredient,
    ProductIngredientDetail, ProductIngredientPatch, ProductPatch, ProductWithIngredients,
    ResearchDocument, User,
};

pub use memory::MemStorage;
pub use postgres::PgStorage;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate SKU).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A referenced product, batch or ingredient does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// The data-access contract shared by every backend.
///
/// Lists are ordered by id. Lookups return `Ok(None)` for missing rows;
/// updates and deletes report a missing target as `None` / `false` rather
/// than an error.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Cheap liveness check used by the readiness probe.
    async fn ping(&self) -> Result<()>;

    // Users

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    // Products

    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;
    async fn get_product_by_name(&self, name: &str) -> Result<Option<Product>>;
    async fn get_product_by_sku(&self, sku: &Sku) -> Result<Option<Product>>;
    async fn list_products_by_health_benefit(&self, benefit: HealthBenefit)
    -> Result<Vec<Product>>;
    /// Fails with `Conflict` when the SKU is taken.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;
    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Option<Product>>;
    async fn delete_product(&self, id: ProductId) -> Result<bool>;

    // Ingredients

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>>;
    async fn get_ingredient(&self, id: IngredientId) -> Result<Option<Ingredient>>;
    async fn create_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient>;
    async fn update_ingredient(
        &self,
        id: IngredientId,
        patch: IngredientPatch,
    ) -> Result<Option<Ingredient>>;

    // Product composition

    async fn add_ingredient_to_product(
        &self,
        row: NewProductIngredient,
    ) -> Result<ProductIngredient>;
    async fn update_product_ingredient(
        &self,
        id: ProductIngredientId,
        patch: ProductIngredientPatch,
    ) -> Result<Option<ProductIngredient>>;
    async fn remove_ingredient_from_product(&self, id: ProductIngredientId) -> Result<bool>;
    async fn list_product_ingredients(&self, product_id: ProductId)
    -> Result<Vec<ProductIngredient>>;

    // Batches

    async fn list_batches(&self) -> Result<Vec<Batch>>;
    async fn get_batch(&self, id: BatchId) -> Result<Option<Batch>>;
    async fn get_batch_by_code(&self, code: &BatchCode) -> Result<Option<Batch>>;
    /// Fails with `Conflict` on a duplicate code.
    async fn create_batch(&self, batch: NewBatch) -> Result<Batch>;
    async fn update_batch(&self, id: BatchId, patch: BatchPatch) -> Result<Option<Batch>>;
    async fn delete_batch(&self, id: BatchId) -> Result<bool>;
    async fn list_batches_by_product(&self, product_id: ProductId) -> Result<Vec<Batch>>;

    // Batch provenance

    async fn add_ingredient_to_batch(&self, row: NewBatchIngredient) -> Result<BatchIngredient>;
    async fn list_batch_ingredients(&self, batch_id: BatchId) -> Result<Vec<BatchIngredient>>;

    // Research documents

    async fn list_documents(&self) -> Result<Vec<ResearchDocument>>;
    async fn create_document(&self, document: NewResearchDocument) -> Result<ResearchDocument>;
    async fn list_documents_by_batch(&self, batch_id: BatchId) -> Result<Vec<ResearchDocument>>;
    async fn list_documents_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ResearchDocument>>;
    async fn list_documents_by_ingredient(
        &self,
        ingredient_id: IngredientId,
    ) -> Result<Vec<ResearchDocument>>;

    // Composite reads

    /// A product with each composition row joined to its ingredient.
    async fn get_product_with_ingredients(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithIngredients>> {
        let Some(product) = self.get_product(id).await? else {
            return Ok(None);
        };
        let rows = self.list_product_ingredients(id).await?;
        let index = self.ingredient_index().await?;
        Ok(Some(join_composition(product, rows, &index)))
    }

    /// Products with their composition, optionally limited to one benefit.
    /// The ingredient table is read once for the whole list.
    async fn list_products_with_ingredients(
        &self,
        benefit: Option<HealthBenefit>,
    ) -> Result<Vec<ProductWithIngredients>> {
        let products = match benefit {
            Some(benefit) => self.list_products_by_health_benefit(benefit).await?,
            None => self.list_products().await?,
        };
        let index = self.ingredient_index().await?;

        let mut result = Vec::with_capacity(products.len());
        for product in products {
            let rows = self.list_product_ingredients(product.id).await?;
            result.push(join_composition(product, rows, &index));
        }
        Ok(result)
    }

    /// Everything shown on the public batch page. `None` when the batch or
    /// its product is missing.
    async fn get_batch_with_details(&self, code: &BatchCode) -> Result<Option<BatchWithDetails>> {
        let Some(batch) = self.get_batch_by_code(code).await? else {
            return Ok(None);
        };
        let Some(product) = self.get_product(batch.product_id).await? else {
            return Ok(None);
        };
        let rows = self.list_batch_ingredients(batch.id).await?;
        let ingredients = self.ingredient_index().await?;
        let documents = self.list_documents_by_batch(batch.id).await?;

        let ingredients = rows
            .into_iter()
            .map(|row| BatchIngredientDetail {
                ingredient: lookup_ingredient(&ingredients, row.ingredient_id),
                row,
            })
            .collect();

        Ok(Some(BatchWithDetails {
            batch,
            product,
            ingredients,
            documents,
        }))
    }

    /// All ingredients keyed by id, for joining composition rows.
    async fn ingredient_index(&self) -> Result<BTreeMap<IngredientId, Ingredient>> {
        Ok(self
            .list_ingredients()
            .await?
            .into_iter()
            .map(|ingredient| (ingredient.id, ingredient))
            .collect())
    }
}

fn join_composition(
    product: Product,
    rows: Vec<ProductIngredient>,
    index: &BTreeMap<IngredientId, Ingredient>,
) -> ProductWithIngredients {
    let ingredients = rows
        .into_iter()
        .map(|row| ProductIngredientDetail {
            ingredient: lookup_ingredient(index, row.ingredient_id),
            row,
        })
        .collect();

    ProductWithIngredients {
        product,
        ingredients,
    }
}

fn lookup_ingredient(index: &BTreeMap<IngredientId, Ingredient>, id: IngredientId) -> Ingredient {
    index.get(&id).cloned().unwrap_or_else(|| {
        tracing::warn!(ingredient_id = %id, "composition row references a missing ingredient");
        Ingredient::unknown(id)
    })
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
