//! Authentication service.
//!
//! Username/password authentication with Argon2id hashes. Only PHC hash
//! strings are ever stored.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use crate::db::{RepositoryError, Storage};
use crate::models::{NewUser, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    storage: &'a dyn Storage,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Register a new user with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingUsername` if the username is blank.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingUsername);
        }

        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .storage
            .create_user(NewUser {
                username: username.to_owned(),
                password_hash,
                is_admin,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, is_admin, "User registered");
        Ok(user)
    }

    /// Check a username/password pair.
    ///
    /// An unknown user and a wrong password are indistinguishable to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn validate_user(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .storage
            .get_user_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemStorage;

    #[tokio::test]
    async fn test_register_then_validate() {
        let storage = MemStorage::new();
        let auth = AuthService::new(&storage);

        let user = auth.register("admin", "correct horse battery", true).await.unwrap();
        assert!(user.is_admin);
        assert!(user.password_hash.starts_with("$argon2id$"));

        let validated = auth.validate_user("admin", "correct horse battery").await.unwrap();
        assert_eq!(validated.id, user.id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let storage = MemStorage::new();
        let auth = AuthService::new(&storage);
        auth.register("admin", "correct horse battery", true).await.unwrap();

        assert!(matches!(
            auth.validate_user("admin", "wrong password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.validate_user("nobody", "correct horse battery").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_rules() {
        let storage = MemStorage::new();
        let auth = AuthService::new(&storage);

        assert!(matches!(
            auth.register("admin", "short", true).await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.register("   ", "long enough password", false).await,
            Err(AuthError::MissingUsername)
        ));

        auth.register("admin", "long enough password", false).await.unwrap();
        assert!(matches!(
            auth.register("admin", "another password", false).await,
            Err(AuthError::UserAlreadyExists)
        ));
    }
}
