//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Open a second connection to the same database instance.
    ///
    /// The ledger uses this so it sees the same in-memory or file database
    /// as the migrations it records.
    pub fn try_clone_connection(&self) -> DbResult<Connection> {
        self.lock()?
            .try_clone()
            .map_err(|e| DbError::ConnectionError(format!("failed to clone connection: {e}")))
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute batch SQL inside BEGIN / COMMIT, rolling back on error
    fn execute_batch_in_transaction_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        log::debug!("duckdb: BEGIN TRANSACTION");
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

        log::debug!("duckdb: {sql}");
        if let Err(e) = conn.execute_batch(sql) {
            log::debug!("duckdb: ROLLBACK");
            if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                log::warn!("duckdb: ROLLBACK failed after execution error: {rollback_err}");
            }
            return Err(DbError::ExecutionError(e.to_string()));
        }

        log::debug!("duckdb: COMMIT");
        if let Err(commit_err) = conn.execute_batch("COMMIT") {
            log::debug!("duckdb: ROLLBACK");
            if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                log::warn!("duckdb: ROLLBACK failed after commit error: {rollback_err}");
            }
            return Err(DbError::TransactionError(format!(
                "COMMIT failed: {commit_err}"
            )));
        }
        Ok(())
    }

    fn health_check_sync(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(|e| DbError::ConnectionError(format!("health check failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute_batch_in_transaction(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_in_transaction_sync(sql)
    }

    async fn health_check(&self) -> DbResult<()> {
        self.health_check_sync()
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
