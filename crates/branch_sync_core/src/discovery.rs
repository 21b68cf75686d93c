//! Discovery of the repositories a sync run targets.

use github_client::RepositoryClient;
use tracing::{debug, info, instrument};

use crate::errors::{SyncError, SyncResult};
use crate::target::TargetRepository;

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;

/// Lists the repositories tagged with `topic` that the authenticated user administers.
///
/// Repositories keep the order GitHub returned them in. An empty result is not an error.
#[instrument(skip(client))]
pub async fn discover_targets(
    client: &dyn RepositoryClient,
    topic: &str,
) -> SyncResult<Vec<TargetRepository>> {
    let repositories = client
        .list_user_repositories()
        .await
        .map_err(SyncError::Discovery)?;

    let total = repositories.len();
    let targets: Vec<TargetRepository> = repositories
        .iter()
        .filter(|repo| {
            let selected = repo.has_topic(topic) && repo.is_admin();
            if repo.has_topic(topic) && !selected {
                debug!(repository = %repo.full_name, "Skipping repository without admin access");
            }
            selected
        })
        .map(TargetRepository::from)
        .collect();

    info!(
        topic = topic,
        visible = total,
        selected = targets.len(),
        "Discovered target repositories"
    );
    Ok(targets)
}
