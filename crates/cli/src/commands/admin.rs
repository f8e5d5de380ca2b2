//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! CL_ADMIN_PASSWORD='...' cl-cli admin create -u alice
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `CL_ADMIN_PASSWORD` (or the variable named by `--password-env`) - the
//!   new user's password; never passed on the command line

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crowe_logic_storefront::services::auth::{AuthError, AuthService};

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new admin user.
///
/// # Returns
///
/// The ID of the created admin user.
pub async fn create_user(username: &str, password_env: &str) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let password = std::env::var(password_env)
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingEnvVar(password_env.to_owned()))?;

    let storage = connect().await?;

    tracing::info!("Creating admin user: {}", username);
    let user = AuthService::new(&storage)
        .register(username, password.expose_secret(), true)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Username: {}",
        user.id,
        user.username
    );

    Ok(user.id.as_i32())
}
