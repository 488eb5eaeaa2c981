//! Domain error types.

use storage::StorageError;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input was rejected before reaching storage.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// An entity id did not resolve.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness rule was violated (email, slug).
    #[error("{0}")]
    Conflict(String),

    /// Login failed. Deliberately identical for unknown email and wrong
    /// password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing, malformed or expired bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// An admin tried to delete their own account.
    #[error("You cannot delete your own account")]
    SelfDeletion,

    /// An error occurred in the storage backend.
    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<StorageError> for DomainError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Conflict(message) => DomainError::Conflict(message),
            other => DomainError::Storage(other),
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(e: ValidationErrors) -> Self {
        DomainError::Validation(e)
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
