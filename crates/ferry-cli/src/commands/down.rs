//! Down command implementation

use anyhow::{Context, Result};
use ferry_engine::{DownSummary, MigrationContext, Orchestrator};

use crate::cli::GlobalArgs;
use crate::commands::common::seconds_label;
use crate::context::RuntimeContext;

/// Execute the down command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let summary = run(&ctx.migration).await?;
    println!("{}", render(&summary));
    Ok(())
}

pub(crate) async fn run(ctx: &MigrationContext) -> Result<DownSummary> {
    Orchestrator::new(ctx)
        .down()
        .await
        .context("Unable to revert the current version")
}

pub(crate) fn render(summary: &DownSummary) -> String {
    format!(
        "Reverted V{} {} using {} [{}]",
        summary.reverted_from.version,
        summary.reverted_from.description,
        summary.downgrade.source_path,
        seconds_label(summary.downgrade.status.execution_seconds())
    )
}
