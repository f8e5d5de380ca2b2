//! Crowe Logic Core - Shared types library.
//!
//! This crate provides common types used across all Crowe Logic components:
//! - `storefront` - Public catalog, batch transparency and admin REST API
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, codes, and enumerations
//! - [`validation`] - Field-level validation errors shared by request payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldError, ValidationErrors};
