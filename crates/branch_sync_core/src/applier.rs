//! Executes single branch protection changes and records their outcome.
//!
//! The applier is the boundary where GitHub client errors stop: every call returns a
//! plain `bool` and the error message only survives in the audit log and the tracing
//! output.

use config_manager::ProtectionPolicy;
use github_client::RepositoryClient;
use serde_json::json;
use tracing::{error, info, warn};

use crate::audit::{AuditAction, AuditLog, AuditRecord};
use crate::target::TargetRepository;

#[cfg(test)]
#[path = "applier_tests.rs"]
mod tests;

/// Applies and removes branch protection on one repository at a time.
///
/// Each call makes exactly one mutating API request and writes exactly one audit record.
/// Failed requests are not retried.
pub struct Applier<'a> {
    client: &'a dyn RepositoryClient,
    audit: &'a AuditLog,
}

impl<'a> Applier<'a> {
    pub fn new(client: &'a dyn RepositoryClient, audit: &'a AuditLog) -> Self {
        Self { client, audit }
    }

    /// Replaces the protection of `branch` with `policy`.
    ///
    /// Returns `true` when GitHub accepted the change.
    pub async fn apply_policy(
        &self,
        target: &TargetRepository,
        branch: &str,
        policy: &ProtectionPolicy,
    ) -> bool {
        let update = policy.to_protection_update();
        let outcome = self
            .client
            .update_branch_protection(&target.owner, &target.name, branch, &update)
            .await;

        let repository = target.full_name();
        let details = json!({ "branch": branch, "protection": policy });
        let record = match outcome {
            Ok(()) => {
                info!(repository = %repository, branch = branch, "Applied branch protection");
                AuditRecord::success(&repository, AuditAction::Apply, details)
            }
            Err(e) => {
                warn!(
                    repository = %repository,
                    branch = branch,
                    error = %e,
                    "Failed to apply branch protection"
                );
                AuditRecord::failure(
                    &repository,
                    AuditAction::Apply,
                    details,
                    e.to_string(),
                )
            }
        };

        self.write(&record);
        record.error.is_none()
    }

    /// Removes the protection of `branch`.
    ///
    /// Returns `true` when GitHub accepted the change.
    pub async fn remove_policy(&self, target: &TargetRepository, branch: &str) -> bool {
        let outcome = self
            .client
            .delete_branch_protection(&target.owner, &target.name, branch)
            .await;

        let repository = target.full_name();
        let details = json!({ "branch": branch });
        let record = match outcome {
            Ok(()) => {
                info!(repository = %repository, branch = branch, "Removed branch protection");
                AuditRecord::success(&repository, AuditAction::Remove, details)
            }
            Err(e) => {
                warn!(
                    repository = %repository,
                    branch = branch,
                    error = %e,
                    "Failed to remove branch protection"
                );
                AuditRecord::failure(&repository, AuditAction::Remove, details, e.to_string())
            }
        };

        self.write(&record);
        record.error.is_none()
    }

    fn write(&self, record: &AuditRecord) {
        if let Err(e) = self.audit.record(record) {
            error!(
                path = %self.audit.path().display(),
                error = %e,
                "Failed to write audit record"
            );
        }
    }
}
