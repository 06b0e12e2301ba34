//! Backend-neutral ledger row and its conversion into a [`MigrationRecord`].

use crate::error::{LedgerError, LedgerResult};
use chrono::{DateTime, Utc};
use ferry_core::{Direction, MigrationRecord, MigrationStatus, Outcome};

/// Record column lists, in [`LedgerRow`] field order.
///
/// Timestamps are selected as epoch milliseconds so both backends read them
/// the same way.
pub(crate) const DUCKDB_RECORD_COLUMNS: &str = "id, version, description, direction, source_path, content, fingerprint, \
     execution_seconds, processed, succeeded, error_message, \
     epoch_ms(created_at), epoch_ms(updated_at)";

pub(crate) const POSTGRES_RECORD_COLUMNS: &str = "id, version, description, direction, source_path, content, fingerprint, \
     execution_seconds, processed, succeeded, error_message, \
     (EXTRACT(EPOCH FROM created_at) * 1000)::BIGINT, \
     (EXTRACT(EPOCH FROM updated_at) * 1000)::BIGINT";

/// A ledger row exactly as persisted
#[derive(Debug, Clone)]
pub(crate) struct LedgerRow {
    pub id: i64,
    pub version: i64,
    pub description: String,
    pub direction: String,
    pub source_path: String,
    pub content: String,
    pub fingerprint: String,
    pub execution_seconds: i64,
    pub processed: bool,
    pub succeeded: bool,
    pub error_message: Option<String>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl LedgerRow {
    /// Validate the row and build the typed record
    pub fn into_record(self) -> LedgerResult<MigrationRecord> {
        let id = self.id;
        let corrupt = |reason: String| LedgerError::CorruptRecord { id, reason };

        let version = u32::try_from(self.version)
            .map_err(|_| corrupt(format!("version {} is out of range", self.version)))?;
        let direction = self.direction.parse::<Direction>().map_err(corrupt)?;
        let execution_seconds = u64::try_from(self.execution_seconds).map_err(|_| {
            corrupt(format!(
                "execution_seconds {} is negative",
                self.execution_seconds
            ))
        })?;
        let status = MigrationStatus::from_columns(
            self.processed,
            self.succeeded,
            self.error_message,
            execution_seconds,
        )
        .map_err(corrupt)?;
        let created_at = timestamp(self.created_at_ms).ok_or_else(|| {
            corrupt(format!("created_at {} is out of range", self.created_at_ms))
        })?;
        let updated_at = timestamp(self.updated_at_ms).ok_or_else(|| {
            corrupt(format!("updated_at {} is out of range", self.updated_at_ms))
        })?;

        Ok(MigrationRecord {
            id,
            version,
            description: self.description,
            direction,
            source_path: self.source_path,
            content: self.content,
            fingerprint: self.fingerprint,
            status,
            created_at,
            updated_at,
        })
    }
}

fn timestamp(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}

/// `processed`, `succeeded`, `error_message` column values for an outcome
pub(crate) fn outcome_columns(outcome: &Outcome) -> (bool, bool, Option<&str>) {
    match outcome {
        Outcome::Succeeded => (true, true, None),
        Outcome::Failed(error) => (true, false, Some(error.as_str())),
    }
}

/// Clamp seconds into the signed column type
pub(crate) fn seconds_column(execution_seconds: u64) -> i64 {
    i64::try_from(execution_seconds).unwrap_or(i64::MAX)
}
