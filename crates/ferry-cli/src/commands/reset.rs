//! Reset command implementation

use anyhow::{Context, Result};
use ferry_engine::{BatchReport, MigrationContext, Orchestrator};

use crate::cli::GlobalArgs;
use crate::commands::common::{seconds_label, ExitCode};
use crate::context::RuntimeContext;

/// Execute the reset command
///
/// Every outstanding downgrade is attempted; the exit code is non-zero when
/// any of them failed.
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let report = run(&ctx.migration).await?;
    println!("{}", render(&report));
    if !report.is_success() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

pub(crate) async fn run(ctx: &MigrationContext) -> Result<BatchReport> {
    Orchestrator::new(ctx)
        .reset()
        .await
        .context("Unable to reset")
}

pub(crate) fn render(report: &BatchReport) -> String {
    if report.attempted() == 0 {
        return "Nothing to revert".to_string();
    }
    let mut lines = Vec::with_capacity(report.attempted() + 1);
    for record in &report.applied {
        lines.push(format!(
            "  \u{2713} {} [{}]",
            record.source_path,
            seconds_label(record.status.execution_seconds())
        ));
    }
    for failure in &report.failures {
        lines.push(format!(
            "  \u{2717} {} - {}",
            failure.record.source_path, failure.error
        ));
    }
    lines.push(format!(
        "Reverted {} of {} downgrade(s)",
        report.applied.len(),
        report.attempted()
    ));
    lines.join("\n")
}
