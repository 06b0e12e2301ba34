//! Error types for the migration engine.

use ferry_core::CoreError;
use ferry_db::DbError;
use ferry_ledger::LedgerError;
use thiserror::Error;

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Reading or parsing a migration file failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The ledger rejected or failed an operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The target database failed outside a migration batch.
    #[error(transparent)]
    Database(#[from] DbError),

    /// A migration's statement batch failed and was rolled back (X001).
    #[error("[X001] Migration {file} failed: {message}")]
    Execution { file: String, message: String },

    /// The record was already attempted and will not be run again (X002).
    #[error("[X002] Migration {file} (id {id}) has already been processed")]
    AlreadyProcessed { id: i64, file: String },

    /// There is no applied upgrade to revert (X003).
    #[error("[X003] No current version: no upgrade has been applied")]
    NoCurrentVersion,
}

impl EngineError {
    /// True for "nothing matched" failures, as opposed to broken state
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::Ledger(LedgerError::NotFound(_)) | EngineError::NoCurrentVersion
        )
    }
}

/// Result type alias for [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
