//! Core types for Crowe Logic.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod code;
pub mod date;
pub mod health;
pub mod id;
pub mod status;

pub use code::{BatchCode, CodeError, Sku};
pub use health::{HealthBenefit, UnknownVariant};
pub use id::*;
pub use status::*;
