use thiserror::Error;

/// Errors that can occur when interacting with a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A uniqueness rule was violated (duplicate email, duplicate slug).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a local data file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hashing the bootstrap admin password failed.
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Seeding work on the blocking pool did not complete.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A stored value could not be mapped onto the data model.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
