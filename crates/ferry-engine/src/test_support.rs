//! Shared fixture: in-memory DuckDB target, ledger on the same instance,
//! and a temporary migration directory.

use crate::context::MigrationContext;
use async_trait::async_trait;
use ferry_core::{Direction, MigrationDescriptor, MigrationRecord, Outcome, VersionOrder};
use ferry_db::DuckDbBackend;
use ferry_ledger::{DuckDbLedger, Ledger, LedgerError, LedgerResult, SortOrder};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) struct Fixture {
    pub dir: TempDir,
    pub db: Arc<DuckDbBackend>,
    pub ctx: MigrationContext,
}

impl Fixture {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(DuckDbBackend::in_memory().unwrap());
        let ledger = DuckDbLedger::new(db.try_clone_connection().unwrap());
        ledger.ensure_schema().await.unwrap();
        let ctx = MigrationContext::new(db.clone(), Arc::new(ledger), dir.path());
        Self { dir, db, ctx }
    }

    pub fn write(&self, relative: &str, sql: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, sql).unwrap();
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn table_exists(&self, name: &str) -> bool {
        table_exists(&self.db, name)
    }

    pub fn write_orgs(&self) {
        self.write(
            "V1__init.up.sql",
            "CREATE TABLE orgs (id INTEGER PRIMARY KEY, name VARCHAR NOT NULL);",
        );
        self.write("V1__init.down.sql", "DROP TABLE orgs;");
    }
}

/// Whether `name` is a table in the `main` schema of `db`
pub(crate) fn table_exists(db: &DuckDbBackend, name: &str) -> bool {
    let count: i64 = db
        .try_clone_connection()
        .unwrap()
        .query_row(
            &format!(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = 'main' AND table_name = '{name}'"
            ),
            [],
            |row| row.get(0),
        )
        .unwrap();
    count > 0
}

/// Delegates to `inner` but refuses every outcome write
pub(crate) struct RejectingUpdates {
    pub inner: Arc<dyn Ledger>,
}

#[async_trait]
impl Ledger for RejectingUpdates {
    async fn ensure_schema(&self) -> LedgerResult<()> {
        self.inner.ensure_schema().await
    }

    async fn count_by_source_path(&self, source_path: &str) -> LedgerResult<u64> {
        self.inner.count_by_source_path(source_path).await
    }

    async fn find_by_source_path(
        &self,
        source_path: &str,
    ) -> LedgerResult<Option<MigrationRecord>> {
        self.inner.find_by_source_path(source_path).await
    }

    async fn insert(&self, descriptor: &MigrationDescriptor) -> LedgerResult<MigrationRecord> {
        self.inner.insert(descriptor).await
    }

    async fn fetch_outstanding(
        &self,
        direction: Direction,
        order: SortOrder,
    ) -> LedgerResult<Vec<MigrationRecord>> {
        self.inner.fetch_outstanding(direction, order).await
    }

    async fn fetch_outstanding_by_version(
        &self,
        version: u32,
        direction: Direction,
    ) -> LedgerResult<MigrationRecord> {
        self.inner.fetch_outstanding_by_version(version, direction).await
    }

    async fn update(
        &self,
        id: i64,
        _execution_seconds: u64,
        _outcome: &Outcome,
    ) -> LedgerResult<MigrationRecord> {
        Err(LedgerError::QueryError(format!("ledger is read-only (id {id})")))
    }

    async fn current_version(&self, order: VersionOrder) -> LedgerResult<MigrationRecord> {
        self.inner.current_version(order).await
    }

    async fn list_all(&self) -> LedgerResult<Vec<MigrationRecord>> {
        self.inner.list_all().await
    }
}
