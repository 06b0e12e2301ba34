//! Ledger trait definition

use crate::error::LedgerResult;
use async_trait::async_trait;
use ferry_core::{Direction, MigrationDescriptor, MigrationRecord, Outcome, VersionOrder};

/// Ordering of outstanding records by surrogate id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest registration first
    Ascending,
    /// Newest registration first
    Descending,
}

impl SortOrder {
    pub(crate) fn sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Durable record of every registered migration and its outcome
///
/// Records are created once by [`insert`](Ledger::insert), mutated once by
/// [`update`](Ledger::update), and never deleted.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Create the ledger table if it does not exist
    async fn ensure_schema(&self) -> LedgerResult<()>;

    /// Number of records registered for `source_path` (0 or 1)
    async fn count_by_source_path(&self, source_path: &str) -> LedgerResult<u64>;

    /// The record registered for `source_path`, if any
    async fn find_by_source_path(&self, source_path: &str)
        -> LedgerResult<Option<MigrationRecord>>;

    /// Register a descriptor as a new unprocessed record.
    ///
    /// Fails with [`LedgerError::Duplicate`](crate::LedgerError::Duplicate)
    /// when `(version, direction)` is already taken.
    async fn insert(&self, descriptor: &MigrationDescriptor) -> LedgerResult<MigrationRecord>;

    /// Every unprocessed record of `direction`, ordered by surrogate id
    async fn fetch_outstanding(
        &self,
        direction: Direction,
        order: SortOrder,
    ) -> LedgerResult<Vec<MigrationRecord>>;

    /// The unprocessed record for `(version, direction)`
    async fn fetch_outstanding_by_version(
        &self,
        version: u32,
        direction: Direction,
    ) -> LedgerResult<MigrationRecord>;

    /// Resolve an unprocessed record with the outcome of its single attempt.
    ///
    /// Fails with [`LedgerError::NotFound`](crate::LedgerError::NotFound)
    /// when `id` is absent or already processed.
    async fn update(
        &self,
        id: i64,
        execution_seconds: u64,
        outcome: &Outcome,
    ) -> LedgerResult<MigrationRecord>;

    /// The successfully applied upgrade that defines the current version.
    ///
    /// Upgrades whose version has a successfully applied downgrade are
    /// skipped. Among the rest, `order` picks the winner.
    async fn current_version(&self, order: VersionOrder) -> LedgerResult<MigrationRecord>;

    /// Every record, ascending by surrogate id
    async fn list_all(&self) -> LedgerResult<Vec<MigrationRecord>>;
}
