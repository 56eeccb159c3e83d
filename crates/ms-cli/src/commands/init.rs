//! Init command implementation - creates the control tables

use anyhow::Result;
use ms_engine::StatusReport;

use crate::cli::{GlobalArgs, InitArgs};
use crate::commands::common::prepare_migrator;

/// Execute the init command
pub(crate) async fn execute(_args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let (name, report) = run(global).await?;

    println!("Initialized migrations for project: {name}");
    println!(
        "  {} migration(s) registered, {} pending",
        report.migrations.len(),
        report.pending_count()
    );
    Ok(())
}

pub(crate) async fn run(global: &GlobalArgs) -> Result<(String, StatusReport)> {
    let (project, mut migrator) = prepare_migrator(global).await?;
    let report = migrator.status().await?;
    Ok((project.config.name, report))
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
