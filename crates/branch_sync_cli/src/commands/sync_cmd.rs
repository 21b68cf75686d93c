//! The `sync` command: reconciles every target repository with the desired state.
//!
//! ```bash
//! # Show what would change
//! branch-sync sync --dry-run
//!
//! # Apply the changes, recording them in the audit log
//! branch-sync sync --config ./branch-sync.toml
//! ```

use std::path::PathBuf;

use branch_sync_core::{
    discover_targets, AuditLog, ChangeSet, SyncOptions, SyncOrchestrator, SyncSummary,
    TargetReport,
};
use clap::Args;
use colored::Colorize;
use config_manager::{load_desired_state, StateSnapshot};
use github_client::RepositoryClient;
use tracing::{info, instrument};

use crate::commands::auth_cmd::create_github_client;
use crate::config::{load_app_config, AppConfig};
use crate::errors::Error;

#[cfg(test)]
#[path = "sync_cmd_tests.rs"]
mod tests;

/// Arguments of the `sync` command.
#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Compute and print the changes without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the configuration file (defaults to ./branch-sync.toml)
    #[arg(long)]
    pub config: Option<String>,
}

/// How a sync run ended, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Every target was processed, even if individual changes failed.
    Completed,

    /// `stop_on_error` cut the run short.
    Truncated,
}

impl SyncOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            SyncOutcome::Completed => 0,
            SyncOutcome::Truncated => 2,
        }
    }
}

/// Result of [`run_sync`].
#[derive(Debug, Clone)]
pub struct SyncRun {
    pub summary: SyncSummary,

    /// Audit log of the run; `None` for dry runs
    pub audit_log: Option<PathBuf>,

    pub dry_run: bool,
}

impl SyncRun {
    pub fn outcome(&self) -> SyncOutcome {
        if self.summary.stopped_early {
            SyncOutcome::Truncated
        } else {
            SyncOutcome::Completed
        }
    }
}

/// Executes the `sync` command end to end and prints the report.
///
/// # Errors
///
/// Returns an error for setup failures only: configuration, desired state, credentials,
/// discovery and audit log creation. Failed changes are part of the printed report.
#[instrument]
pub async fn execute(args: &SyncArgs) -> Result<SyncOutcome, Error> {
    let config = load_app_config(args.config.as_deref())?;
    let desired = load_desired_state(&config.paths.settings_file)
        .map_err(|e| Error::DesiredState(e.to_string()))?;
    let client = create_github_client()?;

    let run = run_sync(&client, &config, &desired, args.dry_run).await?;

    for report in &run.summary.targets {
        print!("{}", format_target_report(report));
    }
    print!("{}", format_summary(&run));

    Ok(run.outcome())
}

/// Discovers the targets and runs the orchestrator over them.
///
/// Dry runs never create an audit log.
pub async fn run_sync(
    client: &dyn RepositoryClient,
    config: &AppConfig,
    desired: &StateSnapshot,
    dry_run: bool,
) -> Result<SyncRun, Error> {
    let topic = &config.sync.target_topic;
    let targets = discover_targets(client, topic)
        .await
        .map_err(|e| Error::GitHub(e.to_string()))?;
    if targets.is_empty() {
        return Err(Error::NoTargets {
            topic: topic.clone(),
        });
    }
    info!(count = targets.len(), topic = %topic, "Found target repositories");

    let options = SyncOptions {
        preview: dry_run,
        stop_on_error: config.sync.stop_on_error,
        max_concurrent_targets: config.sync.max_concurrent_targets,
    };

    if dry_run {
        let summary = SyncOrchestrator::preview(client)
            .run(desired, &targets, &options)
            .await;
        return Ok(SyncRun {
            summary,
            audit_log: None,
            dry_run,
        });
    }

    let audit =
        AuditLog::open(&config.paths.logs_dir).map_err(|e| Error::AuditLog(e.to_string()))?;
    let summary = SyncOrchestrator::new(client, &audit)
        .run(desired, &targets, &options)
        .await;

    Ok(SyncRun {
        summary,
        audit_log: Some(audit.path().to_path_buf()),
        dry_run,
    })
}

/// Lists the changes of one target, one line per branch.
pub fn format_target_report(report: &TargetReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", report.target.to_string().bold().bright_cyan()));

    if let Some(error) = &report.fetch_error {
        output.push_str(&format!(
            "  {} Failed to read branch protection: {}\n",
            "✗".red(),
            error
        ));
        return output;
    }

    if !report.changes.has_changes {
        output.push_str(&format!("  {} {}\n", "✓".green(), "In sync".dimmed()));
        return output;
    }

    output.push_str(&format_changes(&report.changes));

    if report.success_count + report.error_count > 0 {
        output.push_str(&format!(
            "  {} applied, {} failed\n",
            report.success_count.to_string().green(),
            report.error_count.to_string().red()
        ));
    }
    if report.aborted {
        output.push_str(&format!(
            "  {}\n",
            "Stopped after the first failed change".yellow()
        ));
    }

    output
}

fn format_changes(changes: &ChangeSet) -> String {
    let mut output = String::new();
    for addition in &changes.additions {
        output.push_str(&format!(
            "  {} {}: Add protection\n",
            "+".green(),
            addition.branch
        ));
    }
    for modification in &changes.modifications {
        output.push_str(&format!(
            "  {} {}: Update protection\n",
            "~".yellow(),
            modification.branch
        ));
    }
    for deletion in &changes.deletions {
        output.push_str(&format!(
            "  {} {}: Remove protection\n",
            "-".red(),
            deletion.branch
        ));
    }
    output
}

/// Totals of the run, plus the audit log location when changes were applied.
pub fn format_summary(run: &SyncRun) -> String {
    let summary = &run.summary;
    let mut output = String::new();

    let title = if run.dry_run {
        "Dry run summary"
    } else {
        "Sync summary"
    };
    output.push_str(&format!("\n{}\n", title.bold()));
    output.push_str(&format!("  Repositories: {}\n", summary.targets.len()));
    output.push_str(&format!("  Changes: {}\n", summary.total_changes));

    if run.dry_run {
        output.push_str(&format!("  {}\n", "No changes were applied".dimmed()));
    } else {
        output.push_str(&format!(
            "  Applied: {}\n",
            summary.total_success.to_string().green()
        ));
        output.push_str(&format!(
            "  Failed: {}\n",
            summary.total_errors.to_string().red()
        ));
    }

    if summary.stopped_early {
        output.push_str(&format!(
            "{}\n",
            "✗ Sync stopped early because stop_on_error is set".red().bold()
        ));
    }

    if let Some(path) = &run.audit_log {
        output.push_str(&format!("  Audit log: {}\n", path.display()));
    }

    output
}
