//! The `export` command: captures a repository's live branch protection as a
//! desired-state file.
//!
//! Exporting a well-configured repository is the usual way to bootstrap the desired state
//! for all other repositories.

use std::path::{Path, PathBuf};

use branch_sync_core::{fetch_snapshot, TargetRepository};
use clap::Args;
use config_manager::{save_desired_state, StateSnapshot};
use github_client::RepositoryClient;
use tracing::{info, instrument};

use crate::commands::auth_cmd::create_github_client;
use crate::config::load_app_config;
use crate::errors::Error;

#[cfg(test)]
#[path = "export_cmd_tests.rs"]
mod tests;

/// Arguments of the `export` command.
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Repository to export, as OWNER/NAME
    #[arg(long)]
    pub repo: String,

    /// File to write (defaults to the configured settings file)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Path to the configuration file (defaults to ./branch-sync.toml)
    #[arg(long)]
    pub config: Option<String>,
}

#[instrument]
pub async fn execute(args: &ExportArgs) -> Result<(), Error> {
    let config = load_app_config(args.config.as_deref())?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.paths.settings_file.clone());

    let client = create_github_client()?;
    let snapshot = export_snapshot(&client, &args.repo, &output).await?;

    println!(
        "Exported {} branches ({} protected) from {} to {}",
        snapshot.len(),
        snapshot.protected_count(),
        args.repo,
        output.display()
    );
    Ok(())
}

/// Fetches the live state of `repo` and writes it to `output`.
pub async fn export_snapshot(
    client: &dyn RepositoryClient,
    repo: &str,
    output: &Path,
) -> Result<StateSnapshot, Error> {
    let target: TargetRepository = repo
        .parse()
        .map_err(|e: branch_sync_core::SyncError| Error::InvalidArguments(e.to_string()))?;

    let snapshot = fetch_snapshot(client, &target)
        .await
        .map_err(|e| Error::GitHub(e.to_string()))?;

    save_desired_state(output, &snapshot).map_err(|e| Error::DesiredState(e.to_string()))?;
    info!(
        repository = %target,
        path = %output.display(),
        branches = snapshot.len(),
        "Exported branch protection"
    );

    Ok(snapshot)
}
