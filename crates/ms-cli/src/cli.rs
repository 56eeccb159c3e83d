//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// migrasync - keep a database in step with a set of SQL migrations
#[derive(Parser, Debug)]
#[command(name = "msync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override database path (":memory:" for an in-memory database)
    #[arg(short, long, global = true, env = "MSYNC_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the control tables and register migrations
    Init(InitArgs),

    /// Show registered migrations and their state
    Status(StatusArgs),

    /// Apply pending migrations
    Apply(BatchArgs),

    /// Revert applied migrations
    Revert(BatchArgs),

    /// Print the fingerprint of the migrations on disk
    Fingerprint(FingerprintArgs),
}

/// Arguments for the init command
#[derive(Args, Debug, Default)]
pub struct InitArgs {}

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the apply and revert commands
#[derive(Args, Debug, Default)]
pub struct BatchArgs {
    /// Maximum number of migrations to run (default: `default_limit` from config)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,

    /// Run every eligible migration
    #[arg(short, long, conflicts_with = "limit")]
    pub all: bool,
}

/// Arguments for the fingerprint command
#[derive(Args, Debug, Default)]
pub struct FingerprintArgs {
    /// Also print each migration's id and order
    #[arg(long)]
    pub list: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
