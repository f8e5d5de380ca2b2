//! `PostgreSQL` storage backend.
//!
//! Queries are checked at runtime (`sqlx::query_as`) so the crate builds
//! without a live database. Rows are read into `*Row` structs and converted
//! into domain types; enum columns are stored as `TEXT` and an unknown value
//! surfaces as [`RepositoryError::DataCorruption`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crowe_logic_core::{
    BatchCode, BatchId, BatchIngredientId, DocumentId, DocumentType, HealthBenefit, IngredientId,
    ProductId, ProductIngredientId, ProductStatus, Sku, UserId,
};

use super::{RepositoryError, Result, Storage};
use crate::models::{
    Batch, BatchIngredient, BatchPatch, Ingredient, IngredientPatch, NewBatch,
    NewBatchIngredient, NewIngredient, NewProduct, NewProductIngredient, NewResearchDocument,
    NewUser, Product, ProductIngredient, ProductIngredientPatch, ProductPatch, ResearchDocument,
    User,
};

const PRODUCT_COLUMNS: &str = "id, name, description, sku, health_benefit, image, status";
const INGREDIENT_COLUMNS: &str = "id, name, scientific_name, description";
const PRODUCT_INGREDIENT_COLUMNS: &str = "id, product_id, ingredient_id, percentage, extract_type";
const BATCH_COLUMNS: &str = "id, batch_code, product_id, production_date, alcohol_percentage, \
                             organic_certification, notes";
const BATCH_INGREDIENT_COLUMNS: &str = "id, batch_id, ingredient_id, percentage, extract_type, \
                                        extraction_ratio, harvest_date";
const DOCUMENT_COLUMNS: &str = "id, title, url, doc_type, ingredient_id, product_id, batch_id";
const USER_COLUMNS: &str = "id, username, password_hash, is_admin";

// =============================================================================
// Row types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    password_hash: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    sku: Sku,
    health_benefit: String,
    image: Option<String>,
    status: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self> {
        let health_benefit = row.health_benefit.parse::<HealthBenefit>().map_err(|e| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;
        let status = row.status.parse::<ProductStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            sku: row.sku,
            health_benefit,
            image: row.image,
            status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id: IngredientId,
    name: String,
    scientific_name: Option<String>,
    description: Option<String>,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            scientific_name: row.scientific_name,
            description: row.description,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductIngredientRow {
    id: ProductIngredientId,
    product_id: ProductId,
    ingredient_id: IngredientId,
    percentage: i32,
    extract_type: Option<String>,
}

impl From<ProductIngredientRow> for ProductIngredient {
    fn from(row: ProductIngredientRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            ingredient_id: row.ingredient_id,
            percentage: row.percentage,
            extract_type: row.extract_type,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BatchRow {
    id: BatchId,
    batch_code: BatchCode,
    product_id: ProductId,
    production_date: DateTime<Utc>,
    alcohol_percentage: Option<i32>,
    organic_certification: Option<String>,
    notes: Option<String>,
}

impl From<BatchRow> for Batch {
    fn from(row: BatchRow) -> Self {
        Self {
            id: row.id,
            batch_code: row.batch_code,
            product_id: row.product_id,
            production_date: row.production_date,
            alcohol_percentage: row.alcohol_percentage,
            organic_certification: row.organic_certification,
            notes: row.notes,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BatchIngredientRow {
    id: BatchIngredientId,
    batch_id: BatchId,
    ingredient_id: IngredientId,
    percentage: i32,
    extract_type: String,
    extraction_ratio: Option<String>,
    harvest_date: Option<DateTime<Utc>>,
}

impl From<BatchIngredientRow> for BatchIngredient {
    fn from(row: BatchIngredientRow) -> Self {
        Self {
            id: row.id,
            batch_id: row.batch_id,
            ingredient_id: row.ingredient_id,
            percentage: row.percentage,
            extract_type: row.extract_type,
            extraction_ratio: row.extraction_ratio,
            harvest_date: row.harvest_date,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: DocumentId,
    title: String,
    url: String,
    doc_type: String,
    ingredient_id: Option<IngredientId>,
    product_id: Option<ProductId>,
    batch_id: Option<BatchId>,
}

impl TryFrom<DocumentRow> for ResearchDocument {
    type Error = RepositoryError;

    fn try_from(row: DocumentRow) -> Result<Self> {
        let doc_type = row.doc_type.parse::<DocumentType>().map_err(|e| {
            RepositoryError::DataCorruption(format!("document {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            title: row.title,
            url: row.url,
            doc_type,
            ingredient_id: row.ingredient_id,
            product_id: row.product_id,
            batch_id: row.batch_id,
        })
    }
}

fn products_from(rows: Vec<ProductRow>) -> Result<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

fn documents_from(rows: Vec<DocumentRow>) -> Result<Vec<ResearchDocument>> {
    rows.into_iter().map(ResearchDocument::try_from).collect()
}

/// Map constraint violations on writes to repository errors.
fn write_error(what: &str) -> impl FnOnce(sqlx::Error) -> RepositoryError + '_ {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return RepositoryError::Conflict(format!("{what} already exists"));
            }
            if db_err.is_foreign_key_violation() {
                return RepositoryError::InvalidReference(db_err.message().to_owned());
            }
        }
        RepositoryError::Database(e)
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Storage backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Storage for PgStorage {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM storefront.users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM storefront.users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO storefront.users (username, password_hash, is_admin) \
             VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("username"))?;
        Ok(row.into())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        products_from(rows)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Product::try_from)
        .transpose()
    }

    async fn get_product_by_name(&self, name: &str) -> Result<Option<Product>> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products WHERE name = $1 ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .map(Product::try_from)
        .transpose()
    }

    async fn get_product_by_sku(&self, sku: &Sku) -> Result<Option<Product>> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products WHERE sku = $1"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?
        .map(Product::try_from)
        .transpose()
    }

    async fn list_products_by_health_benefit(
        &self,
        benefit: HealthBenefit,
    ) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products \
             WHERE health_benefit = $1 ORDER BY id"
        ))
        .bind(benefit.as_str())
        .fetch_all(&self.pool)
        .await?;
        products_from(rows)
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO storefront.products \
             (name, description, sku, health_benefit, image, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(product.health_benefit.as_str())
        .bind(&product.image)
        .bind(product.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("sku"))?
        .try_into()
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Option<Product>> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE storefront.products SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 sku = COALESCE($4, sku), \
                 health_benefit = COALESCE($5, health_benefit), \
                 image = COALESCE($6, image), \
                 status = COALESCE($7, status) \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(&patch.sku)
        .bind(patch.health_benefit.map(HealthBenefit::as_str))
        .bind(&patch.image)
        .bind(patch.status.map(ProductStatus::as_str))
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error("sku"))?
        .map(Product::try_from)
        .transpose()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(ProductId,)> =
            sqlx::query_as("SELECT id FROM storefront.products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(false);
        }

        let (batch_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM storefront.batches WHERE product_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if batch_count > 0 {
            return Err(RepositoryError::Conflict(format!(
                "product {id} still has {batch_count} batch(es)"
            )));
        }

        // product_ingredients cascade; research_documents.product_id is SET NULL
        sqlx::query("DELETE FROM storefront.products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        let rows = sqlx::query_as::<_, IngredientRow>(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM storefront.ingredients ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    async fn get_ingredient(&self, id: IngredientId) -> Result<Option<Ingredient>> {
        let row = sqlx::query_as::<_, IngredientRow>(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM storefront.ingredients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Ingredient::from))
    }

    async fn create_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient> {
        let row = sqlx::query_as::<_, IngredientRow>(&format!(
            "INSERT INTO storefront.ingredients (name, scientific_name, description) \
             VALUES ($1, $2, $3) RETURNING {INGREDIENT_COLUMNS}"
        ))
        .bind(&ingredient.name)
        .bind(&ingredient.scientific_name)
        .bind(&ingredient.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_ingredient(
        &self,
        id: IngredientId,
        patch: IngredientPatch,
    ) -> Result<Option<Ingredient>> {
        let row = sqlx::query_as::<_, IngredientRow>(&format!(
            "UPDATE storefront.ingredients SET \
                 name = COALESCE($2, name), \
                 scientific_name = COALESCE($3, scientific_name), \
                 description = COALESCE($4, description) \
             WHERE id = $1 RETURNING {INGREDIENT_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.scientific_name)
        .bind(&patch.description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Ingredient::from))
    }

    async fn add_ingredient_to_product(
        &self,
        row: NewProductIngredient,
    ) -> Result<ProductIngredient> {
        let row = sqlx::query_as::<_, ProductIngredientRow>(&format!(
            "INSERT INTO storefront.product_ingredients \
             (product_id, ingredient_id, percentage, extract_type) \
             VALUES ($1, $2, $3, $4) RETURNING {PRODUCT_INGREDIENT_COLUMNS}"
        ))
        .bind(row.product_id)
        .bind(row.ingredient_id)
        .bind(row.percentage)
        .bind(&row.extract_type)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("product ingredient"))?;
        Ok(row.into())
    }

    async fn update_product_ingredient(
        &self,
        id: ProductIngredientId,
        patch: ProductIngredientPatch,
    ) -> Result<Option<ProductIngredient>> {
        let row = sqlx::query_as::<_, ProductIngredientRow>(&format!(
            "UPDATE storefront.product_ingredients SET \
                 product_id = COALESCE($2, product_id), \
                 ingredient_id = COALESCE($3, ingredient_id), \
                 percentage = COALESCE($4, percentage), \
                 extract_type = COALESCE($5, extract_type) \
             WHERE id = $1 RETURNING {PRODUCT_INGREDIENT_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.product_id)
        .bind(patch.ingredient_id)
        .bind(patch.percentage)
        .bind(&patch.extract_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error("product ingredient"))?;
        Ok(row.map(ProductIngredient::from))
    }

    async fn remove_ingredient_from_product(&self, id: ProductIngredientId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM storefront.product_ingredients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_product_ingredients(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductIngredient>> {
        let rows = sqlx::query_as::<_, ProductIngredientRow>(&format!(
            "SELECT {PRODUCT_INGREDIENT_COLUMNS} FROM storefront.product_ingredients \
             WHERE product_id = $1 ORDER BY id"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ProductIngredient::from).collect())
    }

    async fn list_batches(&self) -> Result<Vec<Batch>> {
        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {BATCH_COLUMNS} FROM storefront.batches ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Batch::from).collect())
    }

    async fn get_batch(&self, id: BatchId) -> Result<Option<Batch>> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {BATCH_COLUMNS} FROM storefront.batches WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Batch::from))
    }

    async fn get_batch_by_code(&self, code: &BatchCode) -> Result<Option<Batch>> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {BATCH_COLUMNS} FROM storefront.batches WHERE batch_code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Batch::from))
    }

    async fn create_batch(&self, batch: NewBatch) -> Result<Batch> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "INSERT INTO storefront.batches \
             (batch_code, product_id, production_date, alcohol_percentage, \
              organic_certification, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {BATCH_COLUMNS}"
        ))
        .bind(&batch.batch_code)
        .bind(batch.product_id)
        .bind(batch.production_date)
        .bind(batch.alcohol_percentage)
        .bind(&batch.organic_certification)
        .bind(&batch.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("batch code"))?;
        Ok(row.into())
    }

    async fn update_batch(&self, id: BatchId, patch: BatchPatch) -> Result<Option<Batch>> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "UPDATE storefront.batches SET \
                 batch_code = COALESCE($2, batch_code), \
                 product_id = COALESCE($3, product_id), \
                 production_date = COALESCE($4, production_date), \
                 alcohol_percentage = COALESCE($5, alcohol_percentage), \
                 organic_certification = COALESCE($6, organic_certification), \
                 notes = COALESCE($7, notes) \
             WHERE id = $1 RETURNING {BATCH_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.batch_code)
        .bind(patch.product_id)
        .bind(patch.production_date)
        .bind(patch.alcohol_percentage)
        .bind(&patch.organic_certification)
        .bind(&patch.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error("batch code"))?;
        Ok(row.map(Batch::from))
    }

    async fn delete_batch(&self, id: BatchId) -> Result<bool> {
        // batch_ingredients cascade; research_documents.batch_id is SET NULL
        let result = sqlx::query("DELETE FROM storefront.batches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_batches_by_product(&self, product_id: ProductId) -> Result<Vec<Batch>> {
        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {BATCH_COLUMNS} FROM storefront.batches WHERE product_id = $1 ORDER BY id"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Batch::from).collect())
    }

    async fn add_ingredient_to_batch(&self, row: NewBatchIngredient) -> Result<BatchIngredient> {
        let row = sqlx::query_as::<_, BatchIngredientRow>(&format!(
            "INSERT INTO storefront.batch_ingredients \
             (batch_id, ingredient_id, percentage, extract_type, extraction_ratio, harvest_date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {BATCH_INGREDIENT_COLUMNS}"
        ))
        .bind(row.batch_id)
        .bind(row.ingredient_id)
        .bind(row.percentage)
        .bind(&row.extract_type)
        .bind(&row.extraction_ratio)
        .bind(row.harvest_date)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("batch ingredient"))?;
        Ok(row.into())
    }

    async fn list_batch_ingredients(&self, batch_id: BatchId) -> Result<Vec<BatchIngredient>> {
        let rows = sqlx::query_as::<_, BatchIngredientRow>(&format!(
            "SELECT {BATCH_INGREDIENT_COLUMNS} FROM storefront.batch_ingredients \
             WHERE batch_id = $1 ORDER BY id"
        ))
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BatchIngredient::from).collect())
    }

    async fn list_documents(&self) -> Result<Vec<ResearchDocument>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM storefront.research_documents ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        documents_from(rows)
    }

    async fn create_document(&self, document: NewResearchDocument) -> Result<ResearchDocument> {
        sqlx::query_as::<_, DocumentRow>(&format!(
            "INSERT INTO storefront.research_documents \
             (title, url, doc_type, ingredient_id, product_id, batch_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(&document.title)
        .bind(&document.url)
        .bind(document.doc_type.as_str())
        .bind(document.ingredient_id)
        .bind(document.product_id)
        .bind(document.batch_id)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("document"))?
        .try_into()
    }

    async fn list_documents_by_batch(&self, batch_id: BatchId) -> Result<Vec<ResearchDocument>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM storefront.research_documents \
             WHERE batch_id = $1 ORDER BY id"
        ))
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await?;
        documents_from(rows)
    }

    async fn list_documents_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ResearchDocument>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM storefront.research_documents \
             WHERE product_id = $1 ORDER BY id"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        documents_from(rows)
    }

    async fn list_documents_by_ingredient(
        &self,
        ingredient_id: IngredientId,
    ) -> Result<Vec<ResearchDocument>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM storefront.research_documents \
             WHERE ingredient_id = $1 ORDER BY id"
        ))
        .bind(ingredient_id)
        .fetch_all(&self.pool)
        .await?;
        documents_from(rows)
    }
}
