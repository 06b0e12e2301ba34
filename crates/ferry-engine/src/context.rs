//! Explicit collaborators shared by every engine component.

use ferry_core::VersionOrder;
use ferry_db::Database;
use ferry_ledger::Ledger;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The target database, its ledger and the migration source settings.
///
/// Built once per invocation and borrowed by the reconciler, the executor
/// and the orchestrator.
#[derive(Clone)]
pub struct MigrationContext {
    /// Executes migration batches
    pub db: Arc<dyn Database>,

    /// Records registrations and outcomes
    pub ledger: Arc<dyn Ledger>,

    /// Root of the migration file tree
    pub migrations_dir: PathBuf,

    /// Tie-break rule for the current version
    pub version_order: VersionOrder,
}

impl MigrationContext {
    pub fn new(
        db: Arc<dyn Database>,
        ledger: Arc<dyn Ledger>,
        migrations_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            db,
            ledger,
            migrations_dir: migrations_dir.into(),
            version_order: VersionOrder::default(),
        }
    }

    pub fn with_version_order(mut self, order: VersionOrder) -> Self {
        self.version_order = order;
        self
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }
}

impl std::fmt::Debug for MigrationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationContext")
            .field("db", &self.db.db_type())
            .field("migrations_dir", &self.migrations_dir)
            .field("version_order", &self.version_order)
            .finish_non_exhaustive()
    }
}
