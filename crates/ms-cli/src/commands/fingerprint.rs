//! Fingerprint command implementation

use anyhow::Result;
use ms_engine::MigrationRegistry;

use crate::cli::{FingerprintArgs, GlobalArgs};
use crate::commands::common::{boxed_migrations, load_project};

/// Execute the fingerprint command
pub(crate) async fn execute(args: &FingerprintArgs, global: &GlobalArgs) -> Result<()> {
    let registry = run(global)?;

    if args.list {
        for entry in registry.iter() {
            println!("{:>6}  {}", entry.order(), entry.id());
        }
    }
    println!("{}", registry.fingerprint());
    Ok(())
}

/// Registry of the migrations on disk; the database is not opened
pub(crate) fn run(global: &GlobalArgs) -> Result<MigrationRegistry> {
    let project = load_project(global)?;
    let mut registry = MigrationRegistry::new();
    for migration in boxed_migrations(&project) {
        registry.register(migration)?;
    }
    Ok(registry)
}

#[cfg(test)]
#[path = "fingerprint_test.rs"]
mod tests;
