//! Applies migration records and writes their outcome to the ledger.

use crate::context::MigrationContext;
use crate::error::{EngineError, EngineResult};
use ferry_core::{MigrationRecord, Outcome};
use std::time::Instant;

/// How a batch reacts to a failed migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStrategy {
    /// Stop at the first failure and return it
    FailFast,
    /// Record the failure and continue with the next record
    BestEffort,
}

/// A record that failed inside a best-effort batch
#[derive(Debug)]
pub struct BatchFailure {
    pub record: MigrationRecord,
    pub error: EngineError,
}

/// Result of applying a batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records as resolved by the ledger, in application order
    pub applied: Vec<MigrationRecord>,

    /// Failures collected under [`BatchStrategy::BestEffort`]
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of records that were attempted
    pub fn attempted(&self) -> usize {
        self.applied.len() + self.failures.len()
    }
}

/// Runs migration batches against the target database
pub struct Executor<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> Executor<'a> {
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    /// Apply one record in its own transaction and record the outcome.
    ///
    /// The record is processed afterwards whether or not its SQL succeeded.
    /// On failure the execution error is returned even if the ledger write
    /// also failed; the ledger error is only logged.
    pub async fn apply_one(&self, record: &MigrationRecord) -> EngineResult<MigrationRecord> {
        if record.status.is_processed() {
            return Err(EngineError::AlreadyProcessed {
                id: record.id,
                file: record.source_path.clone(),
            });
        }

        log::info!("Applying {}", record.source_path);
        let start = Instant::now();
        let result = self
            .ctx
            .db
            .execute_batch_in_transaction(&record.content)
            .await;
        let execution_seconds = start.elapsed().as_secs();

        match result {
            Ok(()) => {
                let updated = self
                    .ctx
                    .ledger
                    .update(record.id, execution_seconds, &Outcome::Succeeded)
                    .await?;
                log::info!(
                    "Applied {} in {execution_seconds}s",
                    record.source_path
                );
                Ok(updated)
            }
            Err(e) => {
                let message = e.to_string();
                let outcome = Outcome::Failed(message.clone());
                if let Err(ledger_err) = self
                    .ctx
                    .ledger
                    .update(record.id, execution_seconds, &outcome)
                    .await
                {
                    log::warn!(
                        "Could not record failure of {} (id {}): {ledger_err}",
                        record.source_path,
                        record.id
                    );
                }
                log::error!("Failed to apply {}: {message}", record.source_path);
                Err(EngineError::Execution {
                    file: record.source_path.clone(),
                    message,
                })
            }
        }
    }

    /// Apply `records` strictly in the given order
    pub async fn apply_batch(
        &self,
        records: &[MigrationRecord],
        strategy: BatchStrategy,
    ) -> EngineResult<BatchReport> {
        let mut report = BatchReport::default();
        for record in records {
            match self.apply_one(record).await {
                Ok(applied) => report.applied.push(applied),
                Err(error) => match strategy {
                    BatchStrategy::FailFast => return Err(error),
                    BatchStrategy::BestEffort => {
                        log::warn!("Continuing after {}: {error}", record.source_path);
                        report.failures.push(BatchFailure {
                            record: record.clone(),
                            error,
                        });
                    }
                },
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
