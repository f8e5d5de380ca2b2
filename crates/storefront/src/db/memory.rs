//! In-memory storage backend.
//!
//! Every table is a `BTreeMap` keyed by id so lists come back in insertion
//! order. All tables sit behind a single `RwLock`, which makes each
//! uniqueness check and its insert one atomic step.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crowe_logic_core::{
    BatchCode, BatchId, BatchIngredientId, DocumentId, HealthBenefit, IngredientId, ProductId,
    ProductIngredientId, Sku, UserId,
};

use super::{RepositoryError, Result, Storage};
use crate::models::{
    Batch, BatchIngredient, BatchPatch, Ingredient, IngredientPatch, NewBatch,
    NewBatchIngredient, NewIngredient, NewProduct, NewProductIngredient, NewResearchDocument,
    NewUser, Product, ProductIngredient, ProductIngredientPatch, ProductPatch, ResearchDocument,
    User,
};

/// Monotonic id allocator; ids start at 1 and are never reused.
#[derive(Debug)]
struct Sequence(i32);

impl Default for Sequence {
    fn default() -> Self {
        Self(1)
    }
}

impl Sequence {
    fn next(&mut self) -> i32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    products: BTreeMap<ProductId, Product>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    product_ingredients: BTreeMap<ProductIngredientId, ProductIngredient>,
    batches: BTreeMap<BatchId, Batch>,
    batch_ingredients: BTreeMap<BatchIngredientId, BatchIngredient>,
    documents: BTreeMap<DocumentId, ResearchDocument>,

    user_seq: Sequence,
    product_seq: Sequence,
    ingredient_seq: Sequence,
    product_ingredient_seq: Sequence,
    batch_seq: Sequence,
    batch_ingredient_seq: Sequence,
    document_seq: Sequence,
}

impl Tables {
    fn require_product(&self, id: ProductId) -> Result<()> {
        if self.products.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidReference(format!(
                "product {id} does not exist"
            )))
        }
    }

    fn require_ingredient(&self, id: IngredientId) -> Result<()> {
        if self.ingredients.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidReference(format!(
                "ingredient {id} does not exist"
            )))
        }
    }

    fn require_batch(&self, id: BatchId) -> Result<()> {
        if self.batches.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidReference(format!(
                "batch {id} does not exist"
            )))
        }
    }

    fn sku_taken(&self, sku: &Sku, except: Option<ProductId>) -> bool {
        self.products
            .values()
            .any(|p| &p.sku == sku && Some(p.id) != except)
    }

    fn batch_code_taken(&self, code: &BatchCode, except: Option<BatchId>) -> bool {
        self.batches
            .values()
            .any(|b| &b.batch_code == code && Some(b.id) != except)
    }
}

/// Storage backed by process memory.
#[derive(Debug, Default)]
pub struct MemStorage {
    tables: RwLock<Tables>,
}

impl MemStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }
        let user = User {
            id: UserId::new(tables.user_seq.next()),
            username: user.username,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn get_product_by_name(&self, name: &str) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().find(|p| p.name == name).cloned())
    }

    async fn get_product_by_sku(&self, sku: &Sku) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().find(|p| &p.sku == sku).cloned())
    }

    async fn list_products_by_health_benefit(
        &self,
        benefit: HealthBenefit,
    ) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.health_benefit == benefit)
            .cloned()
            .collect())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let mut tables = self.tables.write().await;
        if tables.sku_taken(&product.sku, None) {
            return Err(RepositoryError::Conflict(format!(
                "sku {} already exists",
                product.sku
            )));
        }
        let product = Product {
            id: ProductId::new(tables.product_seq.next()),
            name: product.name,
            description: product.description,
            sku: product.sku,
            health_benefit: product.health_benefit,
            image: product.image,
            status: product.status,
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Option<Product>> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&id) {
            return Ok(None);
        }
        if let Some(sku) = &patch.sku
            && tables.sku_taken(sku, Some(id))
        {
            return Err(RepositoryError::Conflict(format!("sku {sku} already exists")));
        }
        Ok(tables.products.get_mut(&id).map(|product| {
            patch.apply(product);
            product.clone()
        }))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&id) {
            return Ok(false);
        }
        let batch_count = tables.batches.values().filter(|b| b.product_id == id).count();
        if batch_count > 0 {
            return Err(RepositoryError::Conflict(format!(
                "product {id} still has {batch_count} batch(es)"
            )));
        }
        tables.products.remove(&id);
        tables.product_ingredients.retain(|_, row| row.product_id != id);
        for doc in tables.documents.values_mut() {
            if doc.product_id == Some(id) {
                doc.product_id = None;
            }
        }
        Ok(true)
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        Ok(self
            .tables
            .read()
            .await
            .ingredients
            .values()
            .cloned()
            .collect())
    }

    async fn get_ingredient(&self, id: IngredientId) -> Result<Option<Ingredient>> {
        Ok(self.tables.read().await.ingredients.get(&id).cloned())
    }

    async fn create_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient> {
        let mut tables = self.tables.write().await;
        let ingredient = Ingredient {
            id: IngredientId::new(tables.ingredient_seq.next()),
            name: ingredient.name,
            scientific_name: ingredient.scientific_name,
            description: ingredient.description,
        };
        tables.ingredients.insert(ingredient.id, ingredient.clone());
        Ok(ingredient)
    }

    async fn update_ingredient(
        &self,
        id: IngredientId,
        patch: IngredientPatch,
    ) -> Result<Option<Ingredient>> {
        let mut tables = self.tables.write().await;
        Ok(tables.ingredients.get_mut(&id).map(|ingredient| {
            patch.apply(ingredient);
            ingredient.clone()
        }))
    }

    async fn add_ingredient_to_product(
        &self,
        row: NewProductIngredient,
    ) -> Result<ProductIngredient> {
        let mut tables = self.tables.write().await;
        tables.require_product(row.product_id)?;
        tables.require_ingredient(row.ingredient_id)?;
        let row = ProductIngredient {
            id: ProductIngredientId::new(tables.product_ingredient_seq.next()),
            product_id: row.product_id,
            ingredient_id: row.ingredient_id,
            percentage: row.percentage,
            extract_type: row.extract_type,
        };
        tables.product_ingredients.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_product_ingredient(
        &self,
        id: ProductIngredientId,
        patch: ProductIngredientPatch,
    ) -> Result<Option<ProductIngredient>> {
        let mut tables = self.tables.write().await;
        if !tables.product_ingredients.contains_key(&id) {
            return Ok(None);
        }
        if let Some(product_id) = patch.product_id {
            tables.require_product(product_id)?;
        }
        if let Some(ingredient_id) = patch.ingredient_id {
            tables.require_ingredient(ingredient_id)?;
        }
        Ok(tables.product_ingredients.get_mut(&id).map(|row| {
            patch.apply(row);
            row.clone()
        }))
    }

    async fn remove_ingredient_from_product(&self, id: ProductIngredientId) -> Result<bool> {
        Ok(self
            .tables
            .write()
            .await
            .product_ingredients
            .remove(&id)
            .is_some())
    }

    async fn list_product_ingredients(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductIngredient>> {
        let tables = self.tables.read().await;
        Ok(tables
            .product_ingredients
            .values()
            .filter(|row| row.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn list_batches(&self) -> Result<Vec<Batch>> {
        Ok(self.tables.read().await.batches.values().cloned().collect())
    }

    async fn get_batch(&self, id: BatchId) -> Result<Option<Batch>> {
        Ok(self.tables.read().await.batches.get(&id).cloned())
    }

    async fn get_batch_by_code(&self, code: &BatchCode) -> Result<Option<Batch>> {
        let tables = self.tables.read().await;
        Ok(tables
            .batches
            .values()
            .find(|b| &b.batch_code == code)
            .cloned())
    }

    async fn create_batch(&self, batch: NewBatch) -> Result<Batch> {
        let mut tables = self.tables.write().await;
        if tables.batch_code_taken(&batch.batch_code, None) {
            return Err(RepositoryError::Conflict(format!(
                "batch code {} already exists",
                batch.batch_code
            )));
        }
        tables.require_product(batch.product_id)?;
        let batch = Batch {
            id: BatchId::new(tables.batch_seq.next()),
            batch_code: batch.batch_code,
            product_id: batch.product_id,
            production_date: batch.production_date,
            alcohol_percentage: batch.alcohol_percentage,
            organic_certification: batch.organic_certification,
            notes: batch.notes,
        };
        tables.batches.insert(batch.id, batch.clone());
        Ok(batch)
    }

    async fn update_batch(&self, id: BatchId, patch: BatchPatch) -> Result<Option<Batch>> {
        let mut tables = self.tables.write().await;
        if !tables.batches.contains_key(&id) {
            return Ok(None);
        }
        if let Some(code) = &patch.batch_code
            && tables.batch_code_taken(code, Some(id))
        {
            return Err(RepositoryError::Conflict(format!(
                "batch code {code} already exists"
            )));
        }
        if let Some(product_id) = patch.product_id {
            tables.require_product(product_id)?;
        }
        Ok(tables.batches.get_mut(&id).map(|batch| {
            patch.apply(batch);
            batch.clone()
        }))
    }

    async fn delete_batch(&self, id: BatchId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.batches.remove(&id).is_none() {
            return Ok(false);
        }
        tables.batch_ingredients.retain(|_, row| row.batch_id != id);
        for doc in tables.documents.values_mut() {
            if doc.batch_id == Some(id) {
                doc.batch_id = None;
            }
        }
        Ok(true)
    }

    async fn list_batches_by_product(&self, product_id: ProductId) -> Result<Vec<Batch>> {
        let tables = self.tables.read().await;
        Ok(tables
            .batches
            .values()
            .filter(|b| b.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn add_ingredient_to_batch(&self, row: NewBatchIngredient) -> Result<BatchIngredient> {
        let mut tables = self.tables.write().await;
        tables.require_batch(row.batch_id)?;
        tables.require_ingredient(row.ingredient_id)?;
        let row = BatchIngredient {
            id: BatchIngredientId::new(tables.batch_ingredient_seq.next()),
            batch_id: row.batch_id,
            ingredient_id: row.ingredient_id,
            percentage: row.percentage,
            extract_type: row.extract_type,
            extraction_ratio: row.extraction_ratio,
            harvest_date: row.harvest_date,
        };
        tables.batch_ingredients.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_batch_ingredients(&self, batch_id: BatchId) -> Result<Vec<BatchIngredient>> {
        let tables = self.tables.read().await;
        Ok(tables
            .batch_ingredients
            .values()
            .filter(|row| row.batch_id == batch_id)
            .cloned()
            .collect())
    }

    async fn list_documents(&self) -> Result<Vec<ResearchDocument>> {
        Ok(self
            .tables
            .read()
            .await
            .documents
            .values()
            .cloned()
            .collect())
    }

    async fn create_document(&self, document: NewResearchDocument) -> Result<ResearchDocument> {
        let mut tables = self.tables.write().await;
        if let Some(product_id) = document.product_id {
            tables.require_product(product_id)?;
        }
        if let Some(ingredient_id) = document.ingredient_id {
            tables.require_ingredient(ingredient_id)?;
        }
        if let Some(batch_id) = document.batch_id {
            tables.require_batch(batch_id)?;
        }
        let document = ResearchDocument {
            id: DocumentId::new(tables.document_seq.next()),
            title: document.title,
            url: document.url,
            doc_type: document.doc_type,
            ingredient_id: document.ingredient_id,
            product_id: document.product_id,
            batch_id: document.batch_id,
        };
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn list_documents_by_batch(&self, batch_id: BatchId) -> Result<Vec<ResearchDocument>> {
        let tables = self.tables.read().await;
        Ok(tables
            .documents
            .values()
            .filter(|d| d.batch_id == Some(batch_id))
            .cloned()
            .collect())
    }

    async fn list_documents_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ResearchDocument>> {
        let tables = self.tables.read().await;
        Ok(tables
            .documents
            .values()
            .filter(|d| d.product_id == Some(product_id))
            .cloned()
            .collect())
    }

    async fn list_documents_by_ingredient(
        &self,
        ingredient_id: IngredientId,
    ) -> Result<Vec<ResearchDocument>> {
        let tables = self.tables.read().await;
        Ok(tables
            .documents
            .values()
            .filter(|d| d.ingredient_id == Some(ingredient_id))
            .cloned()
            .collect())
    }
}
