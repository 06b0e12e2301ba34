//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Target database a migration batch is executed against
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute one or more statements as a single atomic unit.
    ///
    /// Either every statement commits or the transaction is rolled back and
    /// [`DbError::ExecutionError`](crate::DbError::ExecutionError) carries the
    /// database's message.
    async fn execute_batch_in_transaction(&self, sql: &str) -> DbResult<()>;

    /// Run `SELECT 1` to confirm the connection is usable
    async fn health_check(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
