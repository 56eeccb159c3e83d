//! migrasync CLI - apply and revert ledger-tracked SQL migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{apply, fingerprint, init, revert, status};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Init(args) => init::execute(args, &cli.global).await,
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
        cli::Commands::Apply(args) => apply::execute(args, &cli.global).await,
        cli::Commands::Revert(args) => revert::execute(args, &cli.global).await,
        cli::Commands::Fingerprint(args) => fingerprint::execute(args, &cli.global).await,
    }
}

/// `RUST_LOG` wins over the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
