//! Error types for ferry-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement batch failed and was rolled back (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// BEGIN / COMMIT failed (D003)
    #[error("[D003] Transaction failed: {0}")]
    TransactionError(String),

    /// Connection settings are unusable (D004)
    #[error("[D004] Invalid database configuration: {0}")]
    ConfigError(String),

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
