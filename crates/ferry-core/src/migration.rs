//! Migration descriptors, ledger records, and processing outcomes.
//!
//! A [`MigrationDescriptor`] is what the reader derives from a file on disk.
//! A [`MigrationRecord`] is the ledger's persisted view of that descriptor
//! plus its [`MigrationStatus`]. The status is a tagged value so that an
//! unattempted record can never also claim success or carry an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version marker that prefixes the version token of every migration file
pub const VERSION_MARKER: char = 'V';

/// Separator between the version token and the description
pub const STEM_SEPARATOR: &str = "__";

/// Required final extension of a migration file
pub const SQL_EXTENSION: &str = "sql";

/// Direction of a migration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// `*.up.sql` - applies a schema change
    Upgrade,
    /// `*.down.sql` - reverts a schema change
    Downgrade,
}

impl Direction {
    /// Persisted representation (`UPGRADE` / `DOWNGRADE`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Upgrade => "UPGRADE",
            Direction::Downgrade => "DOWNGRADE",
        }
    }

    /// Filename tag (`up` / `down`)
    pub fn file_tag(&self) -> &'static str {
        match self {
            Direction::Upgrade => "up",
            Direction::Downgrade => "down",
        }
    }

    /// Map a filename tag to a direction
    pub fn from_file_tag(tag: &str) -> Option<Self> {
        match tag {
            "up" => Some(Direction::Upgrade),
            "down" => Some(Direction::Downgrade),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPGRADE" => Ok(Direction::Upgrade),
            "DOWNGRADE" => Ok(Direction::Downgrade),
            other => Err(format!("unknown migration direction '{other}'")),
        }
    }
}

/// A migration file parsed from disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationDescriptor {
    /// Numeric version parsed from `V{version}`
    pub version: u32,

    /// Free text after the `__` separator
    pub description: String,

    /// Upgrade or downgrade
    pub direction: Direction,

    /// Ledger key: path relative to the migration root, `/`-separated
    pub source_path: String,

    /// Raw statement batch
    pub content: String,

    /// SHA-256 of the raw file bytes
    pub fingerprint: String,
}

impl MigrationDescriptor {
    /// Canonical filename for this descriptor's `(version, description, direction)`
    pub fn file_name(&self) -> String {
        canonical_file_name(self.version, &self.description, self.direction)
    }
}

/// Build `V{version}__{description}.{up|down}.sql`
pub fn canonical_file_name(version: u32, description: &str, direction: Direction) -> String {
    format!(
        "{VERSION_MARKER}{version}{STEM_SEPARATOR}{description}.{}.{SQL_EXTENSION}",
        direction.file_tag()
    )
}

/// Terminal result of attempting a migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(String),
}

/// Processing state of a ledger record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MigrationStatus {
    /// Registered but never attempted (outstanding)
    Pending,

    /// Attempted and committed
    Applied { execution_seconds: u64 },

    /// Attempted and rolled back; never retried
    Failed {
        execution_seconds: u64,
        error: String,
    },
}

impl MigrationStatus {
    /// Status after a single attempt
    pub fn resolved(execution_seconds: u64, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Succeeded => MigrationStatus::Applied { execution_seconds },
            Outcome::Failed(error) => MigrationStatus::Failed {
                execution_seconds,
                error,
            },
        }
    }

    /// Rebuild a status from the persisted `processed` / `succeeded` /
    /// `error_message` / `execution_seconds` columns.
    ///
    /// Returns an error describing the violated invariant when the columns
    /// describe an illegal combination.
    pub fn from_columns(
        processed: bool,
        succeeded: bool,
        error_message: Option<String>,
        execution_seconds: u64,
    ) -> Result<Self, String> {
        let error_message = error_message.filter(|e| !e.is_empty());
        match (processed, succeeded, error_message) {
            (false, false, None) => Ok(MigrationStatus::Pending),
            (false, _, _) => Err(
                "unprocessed record is marked succeeded or carries an error message".to_string(),
            ),
            (true, true, None) => Ok(MigrationStatus::Applied { execution_seconds }),
            (true, true, Some(_)) => {
                Err("succeeded record carries an error message".to_string())
            }
            (true, false, error) => Ok(MigrationStatus::Failed {
                execution_seconds,
                error: error.unwrap_or_default(),
            }),
        }
    }

    /// `processed` column
    pub fn is_processed(&self) -> bool {
        !matches!(self, MigrationStatus::Pending)
    }

    /// `succeeded` column
    pub fn is_succeeded(&self) -> bool {
        matches!(self, MigrationStatus::Applied { .. })
    }

    /// `error_message` column
    pub fn error_message(&self) -> Option<&str> {
        match self {
            MigrationStatus::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// `execution_seconds`, only meaningful once processed
    pub fn execution_seconds(&self) -> Option<u64> {
        match self {
            MigrationStatus::Pending => None,
            MigrationStatus::Applied { execution_seconds }
            | MigrationStatus::Failed {
                execution_seconds, ..
            } => Some(*execution_seconds),
        }
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStatus::Pending => write!(f, "pending"),
            MigrationStatus::Applied { execution_seconds } => {
                write!(f, "applied in {execution_seconds}s")
            }
            MigrationStatus::Failed {
                execution_seconds,
                error,
            } => write!(f, "failed after {execution_seconds}s: {error}"),
        }
    }
}

/// A migration as persisted in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    /// Surrogate key assigned by the ledger; reflects insertion order
    pub id: i64,
    pub version: u32,
    pub description: String,
    pub direction: Direction,
    pub source_path: String,
    pub content: String,
    pub fingerprint: String,
    pub status: MigrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MigrationRecord {
    /// True when the record has never been attempted
    pub fn is_outstanding(&self) -> bool {
        !self.status.is_processed()
    }

    /// Canonical filename of the migration this record was registered from
    pub fn file_name(&self) -> String {
        canonical_file_name(self.version, &self.description, self.direction)
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
