//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (storage ping)
//!
//! # Auth
//! POST /api/auth/login                  - Login (rate limited)
//! POST /api/auth/logout                 - Logout
//! GET  /api/auth/session                - Current user
//!
//! # Catalog
//! GET  /api/products?healthBenefit=     - Products with composition
//! GET  /api/products/{id}               - One product with composition
//! POST /api/products                    - Create (admin)
//! PUT  /api/products/{id}               - Partial update (admin)
//! DELETE /api/products/{id}             - Delete (admin)
//! POST /api/product-ingredients         - Add composition row (admin)
//! PUT  /api/product-ingredients/{id}    - Update composition row (admin)
//! DELETE /api/product-ingredients/{id}  - Remove composition row (admin)
//! GET  /api/ingredients                 - Ingredient list
//! POST /api/ingredients                 - Create (admin)
//! PUT  /api/ingredients/{id}            - Partial update (admin)
//!
//! # Batch transparency
//! GET  /api/batches?productId=          - Batch list (admin)
//! GET  /api/batches/code/{batchCode}    - Public batch page data
//! POST /api/batches                     - Create (admin)
//! PUT  /api/batches/{id}                - Partial update (admin)
//! DELETE /api/batches/{id}              - Delete (admin)
//! POST /api/batch-ingredients           - Add batch ingredient (admin)
//! GET  /api/documents?batchId=|productId=|ingredientId=
//! POST /api/documents                   - Create (admin)
//!
//! # Exports (admin)
//! GET  /api/export/shopify              - Shopify product import records
//! GET  /api/export/qr-codes             - QR targets as JSON
//! GET  /api/export/qr-codes.csv         - QR targets as CSV
//! GET  /api/export/products.csv         - Product list as CSV
//!
//! # Quiz
//! GET  /api/quiz                        - Question set
//! POST /api/quiz/recommendation         - Score answers, recommend products
//! ```

pub mod auth;
pub mod batches;
pub mod documents;
pub mod exports;
pub mod health;
pub mod ingredients;
pub mod product_ingredients;
pub mod products;
pub mod quiz;

use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/auth", auth::router())
        .nest(
            "/api",
            Router::new()
                .merge(products::router())
                .merge(product_ingredients::router())
                .merge(ingredients::router())
                .merge(batches::router())
                .merge(documents::router())
                .merge(exports::router())
                .merge(quiz::router()),
        )
}

/// Parse a path or query ID, rejecting anything that is not an integer.
pub(crate) fn parse_id<T: From<i32>>(raw: &str, message: &str) -> Result<T, AppError> {
    raw.trim()
        .parse::<i32>()
        .map(T::from)
        .map_err(|_| AppError::BadRequest(message.to_string()))
}

/// A query parameter that was sent empty (`?batchId=`) counts as absent.
pub(crate) fn query_value(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}
