//! Domain models for the storefront.
//!
//! Catalog and batch types are also the JSON bodies of the REST API.

pub mod batch;
pub mod catalog;
pub mod document;
pub mod session;
pub mod user;

pub use batch::{
    Batch, BatchIngredient, BatchIngredientDetail, BatchPatch, BatchWithDetails, NewBatch,
    NewBatchIngredient,
};
pub use catalog::{
    Ingredient, IngredientPatch, NewIngredient, NewProduct, NewProductIngredient, Product,
    ProductIngredient, ProductIngredientDetail, ProductIngredientPatch, ProductPatch,
    ProductWithIngredients,
};
pub use document::{NewResearchDocument, ResearchDocument};
pub use session::CurrentUser;
pub use user::{NewUser, User, UserInfo};
