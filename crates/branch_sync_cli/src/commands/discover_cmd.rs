//! The `discover` command: lists the repositories a sync run would target.

use branch_sync_core::{discover_targets, TargetRepository};
use clap::Args;
use colored::Colorize;
use github_client::RepositoryClient;
use tracing::instrument;

use crate::commands::auth_cmd::create_github_client;
use crate::config::load_app_config;
use crate::errors::Error;

#[cfg(test)]
#[path = "discover_cmd_tests.rs"]
mod tests;

/// Arguments of the `discover` command.
#[derive(Args, Debug, Clone, Default)]
pub struct DiscoverArgs {
    /// Topic to look for (defaults to the configured target topic)
    #[arg(long)]
    pub topic: Option<String>,

    /// Path to the configuration file (defaults to ./branch-sync.toml)
    #[arg(long)]
    pub config: Option<String>,
}

#[instrument]
pub async fn execute(args: &DiscoverArgs) -> Result<(), Error> {
    let config = load_app_config(args.config.as_deref())?;
    let topic = args
        .topic
        .clone()
        .unwrap_or_else(|| config.sync.target_topic.clone());

    let client = create_github_client()?;
    let targets = list_targets(&client, &topic).await?;

    print!("{}", format_targets(&topic, &targets));
    Ok(())
}

/// Returns the repositories tagged with `topic`; finding none is an error.
pub async fn list_targets(
    client: &dyn RepositoryClient,
    topic: &str,
) -> Result<Vec<TargetRepository>, Error> {
    let targets = discover_targets(client, topic)
        .await
        .map_err(|e| Error::GitHub(e.to_string()))?;

    if targets.is_empty() {
        return Err(Error::NoTargets {
            topic: topic.to_string(),
        });
    }
    Ok(targets)
}

pub fn format_targets(topic: &str, targets: &[TargetRepository]) -> String {
    let mut output = format!(
        "\n{} {}\n\n",
        "Repositories with topic".bold(),
        topic.bright_cyan()
    );
    for target in targets {
        output.push_str(&format!("  {} {}\n", "✓".green(), target));
    }
    output.push_str(&format!("\n{} repositories\n", targets.len()));
    output
}
