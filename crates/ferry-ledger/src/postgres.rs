//! PostgreSQL ledger implementation

use crate::ddl::{current_version_id_query, POSTGRES_SCHEMA};
use crate::error::{LedgerError, LedgerResult};
use crate::row::{outcome_columns, seconds_column, LedgerRow, POSTGRES_RECORD_COLUMNS};
use crate::traits::{Ledger, SortOrder};
use async_trait::async_trait;
use ferry_core::{Direction, MigrationDescriptor, MigrationRecord, Outcome, VersionOrder};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

/// Ledger stored in a PostgreSQL `schema_migrations` table
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    /// Share the migration target's pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<LedgerRow, sqlx::Error> {
    Ok(LedgerRow {
        id: row.try_get(0)?,
        version: row.try_get(1)?,
        description: row.try_get(2)?,
        direction: row.try_get(3)?,
        source_path: row.try_get(4)?,
        content: row.try_get(5)?,
        fingerprint: row.try_get(6)?,
        execution_seconds: row.try_get(7)?,
        processed: row.try_get(8)?,
        succeeded: row.try_get(9)?,
        error_message: row.try_get(10)?,
        created_at_ms: row.try_get(11)?,
        updated_at_ms: row.try_get(12)?,
    })
}

fn into_record(row: &PgRow) -> LedgerResult<MigrationRecord> {
    map_row(row)?.into_record()
}

#[async_trait]
impl Ledger for PgLedger {
    async fn ensure_schema(&self) -> LedgerResult<()> {
        sqlx::raw_sql(POSTGRES_SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| LedgerError::SchemaError(e.to_string()))?;
        log::debug!("ledger: schema_migrations ready (postgres)");
        Ok(())
    }

    async fn count_by_source_path(&self, source_path: &str) -> LedgerResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations WHERE source_path = $1")
                .bind(source_path)
                .fetch_one(&self.pool)
                .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_by_source_path(
        &self,
        source_path: &str,
    ) -> LedgerResult<Option<MigrationRecord>> {
        let sql = format!(
            "SELECT {POSTGRES_RECORD_COLUMNS} FROM schema_migrations \
             WHERE source_path = $1 ORDER BY id LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(source_path)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(into_record).transpose()
    }

    async fn insert(&self, descriptor: &MigrationDescriptor) -> LedgerResult<MigrationRecord> {
        let sql = format!(
            "INSERT INTO schema_migrations \
             (version, description, direction, source_path, content, fingerprint) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {POSTGRES_RECORD_COLUMNS}"
        );
        let result = sqlx::query(&sql)
            .bind(i64::from(descriptor.version))
            .bind(&descriptor.description)
            .bind(descriptor.direction.as_str())
            .bind(&descriptor.source_path)
            .bind(&descriptor.content)
            .bind(&descriptor.fingerprint)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => {
                log::debug!("ledger: registered {}", descriptor.file_name());
                into_record(&row)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(LedgerError::Duplicate {
                    version: descriptor.version,
                    direction: descriptor.direction,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_outstanding(
        &self,
        direction: Direction,
        order: SortOrder,
    ) -> LedgerResult<Vec<MigrationRecord>> {
        let sql = format!(
            "SELECT {POSTGRES_RECORD_COLUMNS} FROM schema_migrations \
             WHERE direction = $1 AND NOT processed ORDER BY id {}",
            order.sql()
        );
        let rows = sqlx::query(&sql)
            .bind(direction.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(into_record).collect()
    }

    async fn fetch_outstanding_by_version(
        &self,
        version: u32,
        direction: Direction,
    ) -> LedgerResult<MigrationRecord> {
        let sql = format!(
            "SELECT {POSTGRES_RECORD_COLUMNS} FROM schema_migrations \
             WHERE version = $1 AND direction = $2 AND NOT processed"
        );
        let row = sqlx::query(&sql)
            .bind(i64::from(version))
            .bind(direction.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                LedgerError::NotFound(format!("no outstanding V{version} {direction} migration"))
            })?;
        into_record(&row)
    }

    async fn update(
        &self,
        id: i64,
        execution_seconds: u64,
        outcome: &Outcome,
    ) -> LedgerResult<MigrationRecord> {
        let (processed, succeeded, error_message) = outcome_columns(outcome);
        let sql = format!(
            "UPDATE schema_migrations \
             SET execution_seconds = $1, processed = $2, succeeded = $3, error_message = $4, \
                 updated_at = now() \
             WHERE id = $5 AND NOT processed \
             RETURNING {POSTGRES_RECORD_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(seconds_column(execution_seconds))
            .bind(processed)
            .bind(succeeded)
            .bind(error_message)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("no unprocessed record with id {id}")))?;
        into_record(&row)
    }

    async fn current_version(&self, order: VersionOrder) -> LedgerResult<MigrationRecord> {
        let sql = format!(
            "SELECT {POSTGRES_RECORD_COLUMNS} FROM schema_migrations WHERE id = ({})",
            current_version_id_query(order)
        );
        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LedgerError::NotFound("no applied upgrade".to_string()))?;
        into_record(&row)
    }

    async fn list_all(&self) -> LedgerResult<Vec<MigrationRecord>> {
        let sql = format!("SELECT {POSTGRES_RECORD_COLUMNS} FROM schema_migrations ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(into_record).collect()
    }
}
