//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Username/password authentication (Argon2id)
//! - `batch_lookup` - Cached public batch pages
//! - `export` - Shopify import records, QR targets and CSV downloads
//! - `quiz` - Product recommendation quiz

pub mod auth;
pub mod batch_lookup;
pub mod export;
pub mod quiz;
