//! In-memory GitHub client used by the engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use config_manager::{ProtectionPolicy, StateSnapshot};
use github_client::{
    Branch, BranchProtection, BranchProtectionUpdate, EnabledSetting, Error, PullRequestReviews,
    Repository, RepositoryClient, RepositoryPermissions, Restrictions, StatusChecks, TeamRef, User,
    UserRef,
};

/// Builds the GitHub response shape for `policy`.
pub fn remote_protection(policy: &ProtectionPolicy) -> BranchProtection {
    let restrictions = |users: &std::collections::BTreeSet<String>,
                        teams: &std::collections::BTreeSet<String>| Restrictions {
        users: users.iter().map(|u| UserRef { login: u.clone() }).collect(),
        teams: teams.iter().map(|t| TeamRef { slug: t.clone() }).collect(),
    };

    BranchProtection {
        required_status_checks: policy.required_status_checks.as_ref().map(|c| StatusChecks {
            strict: c.strict,
            contexts: c.contexts.clone(),
        }),
        required_pull_request_reviews: policy.required_pull_request_reviews.as_ref().map(|r| {
            PullRequestReviews {
                dismiss_stale_reviews: r.dismiss_stale_reviews,
                require_code_owner_reviews: r.require_code_owner_reviews,
                required_approving_review_count: u32::from(r.required_approving_review_count),
                dismissal_restrictions: if r.dismissal_users.is_empty()
                    && r.dismissal_teams.is_empty()
                {
                    None
                } else {
                    Some(restrictions(&r.dismissal_users, &r.dismissal_teams))
                },
            }
        }),
        enforce_admins: Some(EnabledSetting {
            enabled: policy.enforce_admins,
        }),
        restrictions: policy
            .restrictions
            .as_ref()
            .map(|r| restrictions(&r.users, &r.teams)),
    }
}

pub fn repository(owner: &str, name: &str, topics: &[&str], admin: bool) -> Repository {
    Repository {
        name: name.to_string(),
        full_name: format!("{owner}/{name}"),
        owner: User {
            id: 1,
            login: owner.to_string(),
        },
        topics: topics.iter().map(|t| t.to_string()).collect(),
        permissions: Some(RepositoryPermissions {
            admin,
            ..Default::default()
        }),
        archived: false,
    }
}

/// Scriptable [`RepositoryClient`].
///
/// Repositories are keyed by `owner/name`. Every mutating call is recorded in order.
#[derive(Default)]
pub struct MockClient {
    repositories: Vec<Repository>,
    fail_repository_listing: bool,
    branches: HashMap<String, Vec<Branch>>,
    protections: HashMap<(String, String), BranchProtection>,
    failing_branch_listing: HashSet<String>,
    unreadable_protection: HashSet<(String, String)>,
    failing_mutations: HashSet<(String, String)>,
    calls: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repositories(mut self, repositories: Vec<Repository>) -> Self {
        self.repositories = repositories;
        self
    }

    pub fn with_failing_repository_listing(mut self) -> Self {
        self.fail_repository_listing = true;
        self
    }

    /// Registers the live branches of `repo`. Protected branches are listed as such.
    pub fn with_snapshot(mut self, repo: &str, snapshot: &StateSnapshot) -> Self {
        let branches = snapshot
            .iter()
            .map(|b| Branch {
                name: b.name.clone(),
                protected: b.protection.is_some(),
            })
            .collect();
        self.branches.insert(repo.to_string(), branches);

        for branch in snapshot.iter() {
            if let Some(policy) = &branch.protection {
                self.protections.insert(
                    (repo.to_string(), branch.name.clone()),
                    remote_protection(policy),
                );
            }
        }
        self
    }

    pub fn with_failing_branch_listing(mut self, repo: &str) -> Self {
        self.failing_branch_listing.insert(repo.to_string());
        self
    }

    pub fn with_unreadable_protection(mut self, repo: &str, branch: &str) -> Self {
        self.unreadable_protection
            .insert((repo.to_string(), branch.to_string()));
        self
    }

    pub fn with_failing_mutation(mut self, repo: &str, branch: &str) -> Self {
        self.failing_mutations
            .insert((repo.to_string(), branch.to_string()));
        self
    }

    /// Mutating calls made so far, e.g. `update acme/widgets main`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn mutate(&self, verb: &str, owner: &str, repo: &str, branch: &str) -> Result<(), Error> {
        let full_name = format!("{owner}/{repo}");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{verb} {full_name} {branch}"));
        }

        if self
            .failing_mutations
            .contains(&(full_name, branch.to_string()))
        {
            return Err(Error::ApiError {
                status: 422,
                message: "Validation Failed".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryClient for MockClient {
    async fn get_authenticated_user(&self) -> Result<User, Error> {
        Ok(User {
            id: 1,
            login: "octocat".to_string(),
        })
    }

    async fn list_user_repositories(&self) -> Result<Vec<Repository>, Error> {
        if self.fail_repository_listing {
            return Err(Error::AuthError("Bad credentials".to_string()));
        }
        Ok(self.repositories.clone())
    }

    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>, Error> {
        let full_name = format!("{owner}/{repo}");
        if self.failing_branch_listing.contains(&full_name) {
            return Err(Error::NotFound);
        }
        Ok(self.branches.get(&full_name).cloned().unwrap_or_default())
    }

    async fn get_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>, Error> {
        let key = (format!("{owner}/{repo}"), branch.to_string());
        if self.unreadable_protection.contains(&key) {
            return Err(Error::ApiError {
                status: 403,
                message: "Resource not accessible by integration".to_string(),
            });
        }
        Ok(self.protections.get(&key).cloned())
    }

    async fn update_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        _protection: &BranchProtectionUpdate,
    ) -> Result<(), Error> {
        self.mutate("update", owner, repo, branch)
    }

    async fn delete_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<(), Error> {
        self.mutate("delete", owner, repo, branch)
    }
}
