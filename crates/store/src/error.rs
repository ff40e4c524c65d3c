use thiserror::Error;

/// Errors that can occur when interacting with the shop store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A referential-integrity precondition was violated by the caller
    /// (e.g. adding a nonexistent product to a cart).
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A stored row could not be interpreted.
    #[error("malformed row: {0}")]
    Corrupt(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
