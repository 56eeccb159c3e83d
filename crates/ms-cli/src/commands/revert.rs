//! Revert command implementation

use anyhow::Result;
use ms_engine::BatchReport;

use crate::cli::{BatchArgs, GlobalArgs};
use crate::commands::common::{prepare_migrator, run_config};

/// Execute the revert command
pub(crate) async fn execute(args: &BatchArgs, global: &GlobalArgs) -> Result<()> {
    let report = run(args, global).await?;

    if report.executed.is_empty() {
        println!("Nothing to revert.");
    } else {
        for id in &report.executed {
            println!("  ↺ {id}");
        }
        println!("Reverted {} migration(s)", report.executed.len());
    }
    Ok(())
}

pub(crate) async fn run(args: &BatchArgs, global: &GlobalArgs) -> Result<BatchReport> {
    let (project, mut migrator) = prepare_migrator(global).await?;
    let config = run_config(args, project.config.default_limit);
    Ok(migrator.revert(config).await?)
}

#[cfg(test)]
#[path = "revert_test.rs"]
mod tests;
