//! The four top-level migration commands.

use crate::context::MigrationContext;
use crate::error::{EngineError, EngineResult};
use crate::executor::{BatchReport, BatchStrategy, Executor};
use crate::reconcile::{ReconcileReport, Reconciler};
use ferry_core::{Direction, MigrationRecord};
use ferry_ledger::{LedgerError, SortOrder};

/// Result of `up`
#[derive(Debug)]
pub struct UpSummary {
    pub reconcile: ReconcileReport,
    /// Upgrades applied by this run, oldest first
    pub applied: Vec<MigrationRecord>,
}

/// Result of `down`
#[derive(Debug)]
pub struct DownSummary {
    /// The upgrade that was current before the revert
    pub reverted_from: MigrationRecord,
    /// The downgrade record, now processed
    pub downgrade: MigrationRecord,
}

/// Composes reconciliation, execution and ledger queries into commands
pub struct Orchestrator<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> Orchestrator<'a> {
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    /// The current version, or `None` when no upgrade is applied
    pub async fn version(&self) -> EngineResult<Option<MigrationRecord>> {
        match self.ctx.ledger.current_version(self.ctx.version_order).await {
            Ok(record) => Ok(Some(record)),
            Err(LedgerError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Register new files, then apply every outstanding upgrade oldest first.
    ///
    /// Stops at the first failing upgrade.
    pub async fn up(&self) -> EngineResult<UpSummary> {
        let reconcile = Reconciler::new(self.ctx)
            .reconcile(self.ctx.migrations_dir())
            .await?;

        let outstanding = self
            .ctx
            .ledger
            .fetch_outstanding(Direction::Upgrade, SortOrder::Ascending)
            .await?;
        if outstanding.is_empty() {
            log::info!("No outstanding upgrades");
        }

        let report = Executor::new(self.ctx)
            .apply_batch(&outstanding, BatchStrategy::FailFast)
            .await?;

        Ok(UpSummary {
            reconcile,
            applied: report.applied,
        })
    }

    /// Revert the current version with its registered downgrade
    pub async fn down(&self) -> EngineResult<DownSummary> {
        let current = self
            .version()
            .await?
            .ok_or(EngineError::NoCurrentVersion)?;
        log::debug!("down: current version is {}", current.version);

        let downgrade = self
            .ctx
            .ledger
            .fetch_outstanding_by_version(current.version, Direction::Downgrade)
            .await?;
        let downgrade = Executor::new(self.ctx).apply_one(&downgrade).await?;

        Ok(DownSummary {
            reverted_from: current,
            downgrade,
        })
    }

    /// Apply every outstanding downgrade newest first, continuing past failures
    pub async fn reset(&self) -> EngineResult<BatchReport> {
        let outstanding = self
            .ctx
            .ledger
            .fetch_outstanding(Direction::Downgrade, SortOrder::Descending)
            .await?;
        let report = Executor::new(self.ctx)
            .apply_batch(&outstanding, BatchStrategy::BestEffort)
            .await?;

        for failure in &report.failures {
            log::warn!(
                "reset: {} was not reverted: {}",
                failure.record.source_path,
                failure.error
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
