//! Errors raised by [`AuthService`](super::AuthService).

use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password. The two are indistinguishable to
    /// the caller.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username and password are required")]
    MissingUsername,

    #[error("Username is already taken")]
    UserAlreadyExists,

    /// Password rejected by the registration policy.
    #[error("Password rejected: {0}")]
    WeakPassword(String),

    #[error("User store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Argon2 failed to hash or parse a stored PHC string.
    #[error("Password hashing failed")]
    PasswordHash,
}
