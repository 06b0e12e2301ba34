//! DuckDB ledger implementation

use crate::ddl::{current_version_id_query, DUCKDB_SCHEMA};
use crate::error::{LedgerError, LedgerResult};
use crate::row::{outcome_columns, seconds_column, LedgerRow, DUCKDB_RECORD_COLUMNS};
use crate::traits::{Ledger, SortOrder};
use async_trait::async_trait;
use duckdb::{Connection, OptionalExt};
use ferry_core::{Direction, MigrationDescriptor, MigrationRecord, Outcome, VersionOrder};
use std::sync::{Mutex, MutexGuard};

/// Ledger stored in a DuckDB `schema_migrations` table.
///
/// Usually built from a connection cloned off the migration target so that
/// both share one database instance.
pub struct DuckDbLedger {
    conn: Mutex<Connection>,
}

impl DuckDbLedger {
    /// Wrap an open connection
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Ledger over a private in-memory database
    pub fn in_memory() -> LedgerResult<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LedgerError::QueryError(format!("ledger connection poisoned: {e}")))
    }

    fn query_records(
        conn: &Connection,
        sql: &str,
        params: &[&dyn duckdb::ToSql],
    ) -> LedgerResult<Vec<MigrationRecord>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(LedgerRow::into_record).collect()
    }

    fn query_record(
        conn: &Connection,
        sql: &str,
        params: &[&dyn duckdb::ToSql],
    ) -> LedgerResult<Option<MigrationRecord>> {
        conn.query_row(sql, params, map_row)
            .optional()?
            .map(LedgerRow::into_record)
            .transpose()
    }

    fn record_by_id(conn: &Connection, id: i64) -> LedgerResult<MigrationRecord> {
        let sql = format!("SELECT {DUCKDB_RECORD_COLUMNS} FROM schema_migrations WHERE id = ?");
        Self::query_record(conn, &sql, &[&id])?
            .ok_or_else(|| LedgerError::NotFound(format!("record id {id}")))
    }
}

fn map_row(row: &duckdb::Row<'_>) -> duckdb::Result<LedgerRow> {
    Ok(LedgerRow {
        id: row.get(0)?,
        version: row.get(1)?,
        description: row.get(2)?,
        direction: row.get(3)?,
        source_path: row.get(4)?,
        content: row.get(5)?,
        fingerprint: row.get(6)?,
        execution_seconds: row.get(7)?,
        processed: row.get(8)?,
        succeeded: row.get(9)?,
        error_message: row.get(10)?,
        created_at_ms: row.get(11)?,
        updated_at_ms: row.get(12)?,
    })
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[async_trait]
impl Ledger for DuckDbLedger {
    async fn ensure_schema(&self) -> LedgerResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(DUCKDB_SCHEMA)
            .map_err(|e| LedgerError::SchemaError(e.to_string()))?;
        log::debug!("ledger: schema_migrations ready (duckdb)");
        Ok(())
    }

    async fn count_by_source_path(&self, source_path: &str) -> LedgerResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE source_path = ?",
            duckdb::params![source_path],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_by_source_path(
        &self,
        source_path: &str,
    ) -> LedgerResult<Option<MigrationRecord>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {DUCKDB_RECORD_COLUMNS} FROM schema_migrations \
             WHERE source_path = ? ORDER BY id LIMIT 1"
        );
        Self::query_record(&conn, &sql, &[&source_path])
    }

    async fn insert(&self, descriptor: &MigrationDescriptor) -> LedgerResult<MigrationRecord> {
        let conn = self.lock()?;
        let version = i64::from(descriptor.version);
        let direction = descriptor.direction.as_str();

        let taken: i64 = conn.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ? AND direction = ?",
            duckdb::params![version, direction],
            |row| row.get(0),
        )?;
        if taken > 0 {
            return Err(LedgerError::Duplicate {
                version: descriptor.version,
                direction: descriptor.direction,
            });
        }

        let now = now_ms();
        let id: i64 = conn.query_row(
            "INSERT INTO schema_migrations \
             (version, description, direction, source_path, content, fingerprint, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, epoch_ms(?::BIGINT), epoch_ms(?::BIGINT)) \
             RETURNING id",
            duckdb::params![
                version,
                descriptor.description,
                direction,
                descriptor.source_path,
                descriptor.content,
                descriptor.fingerprint,
                now,
                now
            ],
            |row| row.get(0),
        )?;
        log::debug!(
            "ledger: registered {} as id {id}",
            descriptor.file_name()
        );
        Self::record_by_id(&conn, id)
    }

    async fn fetch_outstanding(
        &self,
        direction: Direction,
        order: SortOrder,
    ) -> LedgerResult<Vec<MigrationRecord>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {DUCKDB_RECORD_COLUMNS} FROM schema_migrations \
             WHERE direction = ? AND NOT processed ORDER BY id {}",
            order.sql()
        );
        Self::query_records(&conn, &sql, &[&direction.as_str()])
    }

    async fn fetch_outstanding_by_version(
        &self,
        version: u32,
        direction: Direction,
    ) -> LedgerResult<MigrationRecord> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {DUCKDB_RECORD_COLUMNS} FROM schema_migrations \
             WHERE version = ? AND direction = ? AND NOT processed"
        );
        Self::query_record(&conn, &sql, &[&i64::from(version), &direction.as_str()])?.ok_or_else(
            || LedgerError::NotFound(format!("no outstanding V{version} {direction} migration")),
        )
    }

    async fn update(
        &self,
        id: i64,
        execution_seconds: u64,
        outcome: &Outcome,
    ) -> LedgerResult<MigrationRecord> {
        let conn = self.lock()?;
        let (processed, succeeded, error_message) = outcome_columns(outcome);
        let changed = conn.execute(
            "UPDATE schema_migrations \
             SET execution_seconds = ?, processed = ?, succeeded = ?, error_message = ?, \
                 updated_at = epoch_ms(?::BIGINT) \
             WHERE id = ? AND NOT processed",
            duckdb::params![
                seconds_column(execution_seconds),
                processed,
                succeeded,
                error_message,
                now_ms(),
                id
            ],
        )?;
        if changed == 0 {
            return Err(LedgerError::NotFound(format!(
                "no unprocessed record with id {id}"
            )));
        }
        Self::record_by_id(&conn, id)
    }

    async fn current_version(&self, order: VersionOrder) -> LedgerResult<MigrationRecord> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {DUCKDB_RECORD_COLUMNS} FROM schema_migrations WHERE id = ({})",
            current_version_id_query(order)
        );
        Self::query_record(&conn, &sql, &[])?
            .ok_or_else(|| LedgerError::NotFound("no applied upgrade".to_string()))
    }

    async fn list_all(&self) -> LedgerResult<Vec<MigrationRecord>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {DUCKDB_RECORD_COLUMNS} FROM schema_migrations ORDER BY id");
        Self::query_records(&conn, &sql, &[])
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
