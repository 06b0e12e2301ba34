//! Registers newly discovered migration files in the ledger.
//!
//! Reconciliation never executes SQL. It walks the migration tree, skips
//! files whose source path is already registered, and inserts a pending
//! record for every new file.

use crate::context::MigrationContext;
use crate::error::EngineResult;
use ferry_core::{
    compute_fingerprint, read_migration, relative_source_path, CoreError, MigrationDescriptor,
    MigrationRecord,
};
use std::fs;
use std::path::{Path, PathBuf};

/// What a reconciliation pass did
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Records inserted by this pass, in insertion order
    pub registered: Vec<MigrationRecord>,

    /// Files that were already registered
    pub skipped: usize,
}

/// Diffs a migration directory against the ledger
pub struct Reconciler<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> Reconciler<'a> {
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    /// Register every unregistered file under `dir`.
    ///
    /// All new files are parsed before anything is inserted, so one
    /// malformed file leaves the ledger untouched.
    pub async fn reconcile(&self, dir: &Path) -> EngineResult<ReconcileReport> {
        let files = discover_files(dir)?;
        log::debug!(
            "reconcile: found {} file(s) under {}",
            files.len(),
            dir.display()
        );

        let mut report = ReconcileReport::default();
        let mut pending: Vec<MigrationDescriptor> = Vec::new();

        for path in &files {
            let source_path = relative_source_path(dir, path);
            if self.ctx.ledger.count_by_source_path(&source_path).await? > 0 {
                self.check_drift(path, &source_path).await?;
                report.skipped += 1;
                continue;
            }
            pending.push(read_migration(path, &source_path)?);
        }

        // Surrogate ids follow numeric order even when file names sort
        // lexically differently (V10 before V2).
        pending.sort_by(|a, b| {
            (a.version, a.direction, &a.source_path).cmp(&(b.version, b.direction, &b.source_path))
        });

        for descriptor in &pending {
            let record = self.ctx.ledger.insert(descriptor).await?;
            log::info!("Registered {} (id {})", record.source_path, record.id);
            report.registered.push(record);
        }

        Ok(report)
    }

    /// Warn when a registered file's content no longer matches the ledger
    async fn check_drift(&self, path: &Path, source_path: &str) -> EngineResult<()> {
        let Some(record) = self.ctx.ledger.find_by_source_path(source_path).await? else {
            return Ok(());
        };
        match fs::read(path) {
            Ok(bytes) => {
                if compute_fingerprint(&bytes) != record.fingerprint {
                    log::warn!(
                        "{source_path} changed since it was registered (id {}); \
                         the registered content is kept",
                        record.id
                    );
                }
            }
            Err(e) => log::warn!("Could not re-read {}: {e}", path.display()),
        }
        Ok(())
    }
}

/// Every regular file under `root`, depth first, lexical per directory.
///
/// Symbolic links are not followed.
pub fn discover_files(root: &Path) -> EngineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, &mut files)?;
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> EngineResult<()> {
    let io_err = |source| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        })?;
        if file_type.is_dir() {
            walk(&path, files)?;
        } else if file_type.is_file() {
            files.push(path);
        } else if file_type.is_symlink() {
            log::warn!("Skipping symbolic link {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
