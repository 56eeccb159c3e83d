//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use ms_core::{Migration, Project};
use ms_db::{Database, DuckDbBackend};
use ms_engine::{LedgerSchema, Migrator, RunConfig, SyncReport};
use std::sync::Arc;

use crate::cli::{BatchArgs, GlobalArgs};

/// Load the project from the global args
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let project = match &global.config {
        Some(config_path) => Project::load_with_config_file(&global.project_dir, config_path),
        None => Project::load(&global.project_dir),
    };
    project.context("Failed to load project")
}

/// Database path after applying the `--database` override
pub(crate) fn resolve_database_path(project: &Project, global: &GlobalArgs) -> String {
    match &global.database {
        Some(path) => path.clone(),
        None => project.database_path(),
    }
}

/// Open the project's database
pub(crate) fn create_database_connection(
    project: &Project,
    global: &GlobalArgs,
) -> Result<Arc<dyn Database>> {
    let path = resolve_database_path(project, global);
    log::debug!("Opening database {path}");
    let db: Arc<dyn Database> =
        Arc::new(DuckDbBackend::new(&path).context("Failed to connect to database")?);
    Ok(db)
}

/// The project's migrations, boxed for registration
pub(crate) fn boxed_migrations(project: &Project) -> Vec<Box<dyn Migration>> {
    project
        .sql_migrations()
        .into_iter()
        .map(|m| Box::new(m) as Box<dyn Migration>)
        .collect()
}

/// Open the database, create the control tables, and register the project's
/// migrations.
pub(crate) async fn prepare_migrator(global: &GlobalArgs) -> Result<(Project, Migrator)> {
    let project = load_project(global)?;
    let db = create_database_connection(&project, global)?;
    let mut migrator = Migrator::with_schema(db, LedgerSchema::from(&project.config.ledger));

    migrator
        .ensure_schema()
        .await
        .context("Failed to create migration control tables")?;

    let report = migrator
        .register_migrations(boxed_migrations(&project))
        .await
        .context("Failed to register migrations")?;
    log_sync(&report);

    Ok((project, migrator))
}

fn log_sync(report: &SyncReport) {
    if !report.changed {
        return;
    }
    if !report.inserted.is_empty() {
        log::info!("Registered {} new migration(s)", report.inserted.len());
    }
    if !report.pruned.is_empty() {
        log::info!(
            "Removed {} stale ledger row(s): {}",
            report.pruned.len(),
            report.pruned.join(", ")
        );
    }
}

/// Batch size from `--limit`/`--all`, falling back to the configured default
pub(crate) fn run_config(args: &BatchArgs, default_limit: usize) -> RunConfig {
    if args.all {
        RunConfig::unbounded()
    } else {
        match args.limit {
            Some(limit) => RunConfig::limit(limit as usize),
            None => RunConfig::limit(default_limit),
        }
    }
}

/// Calculate column widths for table output
fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }
    widths
}

/// Print a simple aligned table to stdout
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  "));

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  "));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
