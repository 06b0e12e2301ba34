//! ferry-engine - Migration engine for Ferry
//!
//! Reconciles a migration directory with the ledger, applies outstanding
//! migrations one transaction each, and exposes the `version`, `up`, `down`
//! and `reset` commands over an explicit [`MigrationContext`].

pub mod context;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod reconcile;

#[cfg(test)]
mod test_support;

pub use context::MigrationContext;
pub use error::{EngineError, EngineResult};
pub use executor::{BatchFailure, BatchReport, BatchStrategy, Executor};
pub use orchestrator::{DownSummary, Orchestrator, UpSummary};
pub use reconcile::{discover_files, ReconcileReport, Reconciler};
