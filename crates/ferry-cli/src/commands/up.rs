//! Up command implementation

use anyhow::{Context, Result};
use ferry_engine::{MigrationContext, Orchestrator, UpSummary};

use crate::cli::GlobalArgs;
use crate::commands::common::seconds_label;
use crate::context::RuntimeContext;

/// Execute the up command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let summary = run(&ctx.migration).await?;
    println!("{}", render(&summary));
    Ok(())
}

pub(crate) async fn run(ctx: &MigrationContext) -> Result<UpSummary> {
    Orchestrator::new(ctx)
        .up()
        .await
        .with_context(|| format!("Upgrade from {} failed", ctx.migrations_dir().display()))
}

pub(crate) fn render(summary: &UpSummary) -> String {
    let mut lines = vec![format!(
        "Registered {} new migration file(s), {} already known",
        summary.reconcile.registered.len(),
        summary.reconcile.skipped
    )];
    if summary.applied.is_empty() {
        lines.push("Nothing to apply: database is up to date".to_string());
    }
    for record in &summary.applied {
        lines.push(format!(
            "  \u{2713} V{} {} [{}]",
            record.version,
            record.description,
            seconds_label(record.status.execution_seconds())
        ));
    }
    lines.join("\n")
}
