//! Crowe Logic storefront library.
//!
//! The catalog, batch-transparency and admin REST API as a library, so the
//! binary, the CLI and the integration tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;

pub use app::{Backend, StartupError, build_router};
