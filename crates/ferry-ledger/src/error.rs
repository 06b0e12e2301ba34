//! Error types for the migration ledger.

use ferry_core::Direction;
use thiserror::Error;

/// Migration ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A record with the same `(version, direction)` already exists (L001).
    #[error("[L001] Migration V{version} {direction} is already registered")]
    Duplicate { version: u32, direction: Direction },

    /// No record matched the query (L002).
    #[error("[L002] Migration not found: {0}")]
    NotFound(String),

    /// Query failed (L003).
    #[error("[L003] Ledger query failed: {0}")]
    QueryError(String),

    /// Ledger table could not be created (L004).
    #[error("[L004] Ledger schema setup failed: {0}")]
    SchemaError(String),

    /// A persisted row violates a record invariant (L005).
    #[error("[L005] Ledger record {id} is corrupt: {reason}")]
    CorruptRecord { id: i64, reason: String },

    /// DuckDB driver error with preserved source chain (L006).
    #[error("[L006] DuckDB error")]
    DuckDb(#[source] duckdb::Error),

    /// PostgreSQL driver error with preserved source chain (L007).
    #[error("[L007] PostgreSQL error")]
    Postgres(#[source] sqlx::Error),
}

/// Result type alias for [`LedgerError`].
pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<duckdb::Error> for LedgerError {
    fn from(err: duckdb::Error) -> Self {
        LedgerError::DuckDb(err)
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Postgres(err)
    }
}
