//! Drives a sync run across all target repositories.
//!
//! For every target the orchestrator fetches the live state, compares it with the desired
//! state and, unless previewing, applies the changes in a fixed order: additions, then
//! modifications, then deletions. Missing protections are put in place before differing
//! ones are overwritten, and stale ones are removed last.
//!
//! Targets run one at a time by default. With `max_concurrent_targets > 1` up to that
//! many targets are in flight at once; `stop_on_error` then stops scheduling new targets
//! once any target reports an error, and targets already in flight finish their own
//! changes up to their first failure.

use std::sync::atomic::{AtomicBool, Ordering};

use config_manager::{ProtectionPolicy, StateSnapshot};
use futures::{future, stream, StreamExt};
use github_client::RepositoryClient;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::applier::Applier;
use crate::audit::AuditLog;
use crate::comparator::{compare, ChangeSet};
use crate::remote::fetch_snapshot;
use crate::target::TargetRepository;

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

/// Options of a single sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute and report changes without applying them
    pub preview: bool,

    /// Abort remaining work after the first failed change
    pub stop_on_error: bool,

    /// Number of targets processed at the same time; values below 1 mean 1
    pub max_concurrent_targets: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            preview: false,
            stop_on_error: false,
            max_concurrent_targets: 1,
        }
    }
}

/// Outcome of one target repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub target: TargetRepository,

    /// Changes found for the target; empty when the fetch failed
    pub changes: ChangeSet,

    pub success_count: usize,
    pub error_count: usize,

    /// Why the live state could not be read
    pub fetch_error: Option<String>,

    /// Set when `stop_on_error` cut the target's changes short
    pub aborted: bool,
}

impl TargetReport {
    fn new(target: TargetRepository, changes: ChangeSet) -> Self {
        Self {
            target,
            changes,
            success_count: 0,
            error_count: 0,
            fetch_error: None,
            aborted: false,
        }
    }

    fn fetch_failed(target: TargetRepository, error: String) -> Self {
        Self {
            error_count: 1,
            fetch_error: Some(error),
            ..Self::new(target, ChangeSet::default())
        }
    }
}

/// Aggregated outcome of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Changes found across all processed targets, also counted in preview mode
    pub total_changes: usize,
    pub total_success: usize,
    pub total_errors: usize,

    /// Reports of the processed targets, in input order
    pub targets: Vec<TargetReport>,

    /// Set when `stop_on_error` truncated the run
    pub stopped_early: bool,
}

enum Step<'c> {
    Apply(&'c str, &'c ProtectionPolicy),
    Remove(&'c str),
}

/// Runs the reconcile loop over a list of targets.
///
/// # Examples
///
/// ```rust,no_run
/// use branch_sync_core::{AuditLog, SyncOptions, SyncOrchestrator, TargetRepository};
/// use config_manager::load_desired_state;
/// use github_client::GitHubClient;
/// use std::path::Path;
///
/// # async fn example(client: GitHubClient) -> Result<(), Box<dyn std::error::Error>> {
/// let desired = load_desired_state(Path::new("settings/branch-protection.json"))?;
/// let audit = AuditLog::open("logs")?;
/// let targets = vec![TargetRepository::new("acme", "widgets")];
///
/// let summary = SyncOrchestrator::new(&client, &audit)
///     .run(&desired, &targets, &SyncOptions::default())
///     .await;
/// println!("{} applied, {} failed", summary.total_success, summary.total_errors);
/// # Ok(())
/// # }
/// ```
pub struct SyncOrchestrator<'a> {
    client: &'a dyn RepositoryClient,
    audit: Option<&'a AuditLog>,
}

impl<'a> SyncOrchestrator<'a> {
    /// Creates an orchestrator that records every applied change in `audit`.
    pub fn new(client: &'a dyn RepositoryClient, audit: &'a AuditLog) -> Self {
        Self {
            client,
            audit: Some(audit),
        }
    }

    /// Creates an orchestrator that can only preview. Runs are treated as preview runs
    /// whatever their options say.
    pub fn preview(client: &'a dyn RepositoryClient) -> Self {
        Self {
            client,
            audit: None,
        }
    }

    pub async fn run(
        &self,
        desired: &StateSnapshot,
        targets: &[TargetRepository],
        options: &SyncOptions,
    ) -> SyncSummary {
        let preview = options.preview || self.audit.is_none();
        if !options.preview && self.audit.is_none() {
            warn!("No audit log available, changes will only be previewed");
        }

        info!(
            targets = targets.len(),
            branches = desired.len(),
            preview = preview,
            stop_on_error = options.stop_on_error,
            "Starting sync run"
        );

        let stop = AtomicBool::new(false);
        let width = options.max_concurrent_targets.max(1);

        let mut reports: Vec<(usize, TargetReport)> = stream::iter(targets.iter().enumerate())
            .map(|(index, target)| {
                let stop = &stop;
                async move {
                    if stop.load(Ordering::SeqCst) {
                        debug!(repository = %target, "Skipping repository after earlier failure");
                        return None;
                    }

                    let report = self
                        .process_target(desired, target, preview, options.stop_on_error)
                        .await;
                    if options.stop_on_error && report.error_count > 0 {
                        stop.store(true, Ordering::SeqCst);
                    }
                    Some((index, report))
                }
            })
            .buffer_unordered(width)
            .filter_map(future::ready)
            .collect()
            .await;
        reports.sort_by_key(|(index, _)| *index);

        let mut summary = SyncSummary {
            stopped_early: stop.load(Ordering::SeqCst),
            ..Default::default()
        };
        for (_, report) in reports {
            summary.total_changes += report.changes.change_count();
            summary.total_success += report.success_count;
            summary.total_errors += report.error_count;
            summary.targets.push(report);
        }

        info!(
            processed = summary.targets.len(),
            changes = summary.total_changes,
            success = summary.total_success,
            errors = summary.total_errors,
            stopped_early = summary.stopped_early,
            "Sync run finished"
        );
        summary
    }

    async fn process_target(
        &self,
        desired: &StateSnapshot,
        target: &TargetRepository,
        preview: bool,
        stop_on_error: bool,
    ) -> TargetReport {
        info!(repository = %target, "Processing repository");

        let actual = match fetch_snapshot(self.client, target).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(repository = %target, error = %e, "Failed to read repository state");
                return TargetReport::fetch_failed(target.clone(), e.to_string());
            }
        };

        let changes = compare(desired, &actual);
        if !changes.has_changes {
            info!(repository = %target, "No changes needed");
            return TargetReport::new(target.clone(), changes);
        }

        info!(
            repository = %target,
            additions = changes.additions.len(),
            modifications = changes.modifications.len(),
            deletions = changes.deletions.len(),
            "Computed changes"
        );

        let audit = match (preview, self.audit) {
            (false, Some(audit)) => audit,
            _ => return TargetReport::new(target.clone(), changes),
        };

        let applier = Applier::new(self.client, audit);
        let mut success_count = 0;
        let mut error_count = 0;
        let mut aborted = false;

        for step in ordered_steps(&changes) {
            let applied = match step {
                Step::Apply(branch, policy) => applier.apply_policy(target, branch, policy).await,
                Step::Remove(branch) => applier.remove_policy(target, branch).await,
            };

            if applied {
                success_count += 1;
            } else {
                error_count += 1;
                if stop_on_error {
                    warn!(repository = %target, "Stopping after failed change");
                    aborted = true;
                    break;
                }
            }
        }

        TargetReport {
            success_count,
            error_count,
            aborted,
            ..TargetReport::new(target.clone(), changes)
        }
    }
}

/// Additions, then modifications, then deletions. A modification that drops the policy
/// of a declared branch becomes a removal.
fn ordered_steps(changes: &ChangeSet) -> Vec<Step<'_>> {
    let additions = changes
        .additions
        .iter()
        .map(|a| Step::Apply(a.branch.as_str(), &a.protection));
    let modifications = changes.modifications.iter().map(|m| match &m.new {
        Some(policy) => Step::Apply(m.branch.as_str(), policy),
        None => Step::Remove(m.branch.as_str()),
    });
    let deletions = changes
        .deletions
        .iter()
        .map(|d| Step::Remove(d.branch.as_str()));

    additions.chain(modifications).chain(deletions).collect()
}
