//! Version command implementation

use anyhow::{Context, Result};
use ferry_core::MigrationRecord;
use serde::Serialize;

use crate::cli::{GlobalArgs, VersionArgs, VersionOutput};
use crate::context::RuntimeContext;

/// JSON shape of `ferry version --output json`
#[derive(Debug, Serialize)]
struct VersionReport<'a> {
    version: Option<u32>,
    description: Option<&'a str>,
    source_path: Option<&'a str>,
    applied_at: Option<String>,
}

impl<'a> VersionReport<'a> {
    fn new(current: Option<&'a MigrationRecord>) -> Self {
        Self {
            version: current.map(|r| r.version),
            description: current.map(|r| r.description.as_str()),
            source_path: current.map(|r| r.source_path.as_str()),
            applied_at: current.map(|r| r.updated_at.to_rfc3339()),
        }
    }
}

/// Execute the version command
pub async fn execute(args: &VersionArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let current = ferry_engine::Orchestrator::new(&ctx.migration)
        .version()
        .await
        .context("Unable to fetch the current version")?;
    println!("{}", render(current.as_ref(), args.output)?);
    Ok(())
}

pub(crate) fn render(current: Option<&MigrationRecord>, output: VersionOutput) -> Result<String> {
    match output {
        VersionOutput::Json => Ok(serde_json::to_string_pretty(&VersionReport::new(current))?),
        VersionOutput::Text => Ok(match current {
            Some(record) => format!(
                "Current version: {} ({}, applied {})",
                record.version,
                record.description,
                record.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => "No migrations applied".to_string(),
        }),
    }
}
