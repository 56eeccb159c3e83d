//! Status command implementation

use anyhow::{Context, Result};
use ms_engine::StatusReport;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{prepare_migrator, print_table};

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let report = run(global).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize status")?;
        println!("{json}");
        return Ok(());
    }

    if report.migrations.is_empty() {
        println!("No migrations found.");
        return Ok(());
    }

    print_table(&["ID", "ORDER", "STATUS", "EXECUTED AT", "DESCRIPTION"], &rows(&report));
    println!();
    println!(
        "{} migration(s), {} pending",
        report.migrations.len(),
        report.pending_count()
    );
    println!("Fingerprint: {}", report.fingerprint);
    if !report.in_sync() {
        let stored = if report.persisted_hash.is_empty() {
            "<none>"
        } else {
            report.persisted_hash.as_str()
        };
        println!("Stored:      {stored}");
    }
    Ok(())
}

pub(crate) async fn run(global: &GlobalArgs) -> Result<StatusReport> {
    let (_project, mut migrator) = prepare_migrator(global).await?;
    Ok(migrator.status().await?)
}

fn rows(report: &StatusReport) -> Vec<Vec<String>> {
    report
        .migrations
        .iter()
        .map(|m| {
            vec![
                m.id.clone(),
                m.order.to_string(),
                if m.executed { "applied" } else { "pending" }.to_string(),
                m.executed_at.clone().unwrap_or_else(|| "-".to_string()),
                m.description.clone(),
            ]
        })
        .collect()
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
