use std::io::{self, Write};

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use branch_sync_cli::commands::{
    auth_cmd::{self, AuthCommands},
    discover_cmd::{self, DiscoverArgs},
    export_cmd::{self, ExportArgs},
    sync_cmd::{self, SyncArgs},
    validate_cmd::{self, ValidateArgs},
};
use branch_sync_cli::errors::Error;

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// branch-sync: Keep branch protection consistent across GitHub repositories
#[derive(Parser)]
#[command(name = "branch-sync")]
#[command(about = "Keep branch protection consistent across GitHub repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Auth(AuthCommands),

    /// List the repositories a sync would target
    Discover(DiscoverArgs),

    /// Write a repository's branch protection to a desired-state file
    Export(ExportArgs),

    /// Apply the desired branch protection to every target repository
    Sync(SyncArgs),

    /// Check a desired-state file for problems
    Validate(ValidateArgs),

    /// Show the CLI version
    Version,
}

/// Exit status for fatal setup errors.
const EXIT_FATAL: i32 = 1;

fn flush_stdout() -> Result<(), Error> {
    io::stdout().flush().map_err(|_| Error::StdOutFlushFailed)
}

fn exit_on_error(result: Result<(), Error>) -> ! {
    let result = result.and_then(|_| flush_stdout());
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!("Error: {e}");
            eprintln!("Error: {e}");
            std::process::exit(EXIT_FATAL);
        }
    }
}

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so that stdout only carries the report
    tracing_subscriber::registry()
        .with(fmt::layer().pretty().with_writer(io::stderr))
        .with(EnvFilter::from_env("BRANCH_SYNC_LOG"))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Auth(cmd) => exit_on_error(auth_cmd::execute(cmd).await),
        Commands::Discover(args) => exit_on_error(discover_cmd::execute(args).await),
        Commands::Export(args) => exit_on_error(export_cmd::execute(args).await),
        Commands::Validate(args) => exit_on_error(validate_cmd::execute(args).await),
        Commands::Sync(args) => match sync_cmd::execute(args).await {
            Ok(outcome) => {
                if let Err(e) = flush_stdout() {
                    error!("Error: {e}");
                }
                std::process::exit(outcome.exit_code());
            }
            Err(e) => {
                error!("Error: {e}");
                eprintln!("Error: {e}");
                std::process::exit(EXIT_FATAL);
            }
        },
        Commands::Version => {
            println!(
                "branch-sync version {}",
                option_env!("BRANCH_SYNC_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
            );
            std::process::exit(0);
        }
    }
}
