//! Reads the live branch protection of a repository.

use config_manager::{BranchRecord, ProtectionPolicy, StateSnapshot};
use github_client::RepositoryClient;
use tracing::{debug, instrument, warn};

use crate::target::TargetRepository;

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;

/// Fetches the current state of every branch of `target`.
///
/// Protection is only read for branches GitHub lists as protected. A protection that
/// cannot be read is reported as absent rather than failing the fetch.
///
/// # Errors
///
/// Returns the client error when the branches cannot be listed.
#[instrument(skip(client), fields(repository = %target))]
pub async fn fetch_snapshot(
    client: &dyn RepositoryClient,
    target: &TargetRepository,
) -> Result<StateSnapshot, github_client::Error> {
    let branches = client.list_branches(&target.owner, &target.name).await?;
    debug!(count = branches.len(), "Listed branches");

    let mut records = Vec::with_capacity(branches.len());
    for branch in branches {
        if !branch.protected {
            records.push(BranchRecord::unprotected(branch.name));
            continue;
        }

        let protection = match client
            .get_branch_protection(&target.owner, &target.name, &branch.name)
            .await
        {
            Ok(protection) => protection.as_ref().map(ProtectionPolicy::from),
            Err(e) => {
                warn!(
                    branch = %branch.name,
                    error = %e,
                    "Could not read branch protection, treating branch as unprotected"
                );
                None
            }
        };

        records.push(BranchRecord {
            name: branch.name,
            protection,
        });
    }

    Ok(StateSnapshot::new(records))
}
