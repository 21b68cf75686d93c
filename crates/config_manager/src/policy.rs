//! Branch protection policy model.
//!
//! These types describe the protection of a single branch, both as declared in the
//! desired-state file and as observed on a live repository. Equality is full structural
//! equality: two policies are the same only if every field matches. Users and teams are
//! stored in ordered sets so the order in which they are listed never affects equality,
//! while status check contexts keep the order they were declared in.

use std::collections::BTreeSet;

use github_client::{
    BranchProtection, BranchProtectionUpdate, PullRequestReviewsUpdate, RestrictionsUpdate,
    StatusChecksUpdate,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;

/// Lowest number of approving reviews a policy may require.
pub const MIN_APPROVING_REVIEW_COUNT: u8 = 1;

/// Highest number of approving reviews GitHub accepts.
pub const MAX_APPROVING_REVIEW_COUNT: u8 = 6;

/// One branch and the protection declared or observed for it.
///
/// A missing `protection` means no policy is declared (desired state) or observed
/// (actual state) for the branch.
///
/// # Examples
///
/// ```rust
/// use config_manager::{BranchRecord, ProtectionPolicy};
///
/// let main = BranchRecord::protected("main", ProtectionPolicy {
///     enforce_admins: true,
///     ..Default::default()
/// });
/// let scratch = BranchRecord::unprotected("scratch");
///
/// assert!(main.protection.is_some());
/// assert!(scratch.protection.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BranchRecord {
    /// Branch name, unique within a snapshot
    pub name: String,

    /// Protection policy of the branch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection: Option<ProtectionPolicy>,
}

impl BranchRecord {
    /// Creates a record for a branch carrying `protection`.
    pub fn protected(name: impl Into<String>, protection: ProtectionPolicy) -> Self {
        Self {
            name: name.into(),
            protection: Some(protection),
        }
    }

    /// Creates a record for a branch without protection.
    pub fn unprotected(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            protection: None,
        }
    }
}

/// Protection policy of a single branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProtectionPolicy {
    /// Status checks that must pass before merging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_status_checks: Option<RequiredStatusChecks>,

    /// Review requirements for pull requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_pull_request_reviews: Option<RequiredPullRequestReviews>,

    /// Apply the protection to administrators as well
    #[serde(default)]
    pub enforce_admins: bool,

    /// Users and teams allowed to push
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<PushRestrictions>,
}

/// Required status checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequiredStatusChecks {
    /// Require branches to be up to date before merging
    pub strict: bool,

    /// Names of the checks that must pass, in declaration order
    pub contexts: Vec<String>,
}

/// Pull request review requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequiredPullRequestReviews {
    #[serde(default)]
    pub require_code_owner_reviews: bool,

    #[serde(default)]
    pub dismiss_stale_reviews: bool,

    /// Number of approvals needed before merging
    #[serde(default = "default_approving_review_count")]
    #[schemars(range(min = 1, max = 6))]
    pub required_approving_review_count: u8,

    /// Users allowed to dismiss reviews
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dismissal_users: BTreeSet<String>,

    /// Teams (slugs) allowed to dismiss reviews
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dismissal_teams: BTreeSet<String>,
}

impl Default for RequiredPullRequestReviews {
    fn default() -> Self {
        Self {
            require_code_owner_reviews: false,
            dismiss_stale_reviews: false,
            required_approving_review_count: default_approving_review_count(),
            dismissal_users: BTreeSet::new(),
            dismissal_teams: BTreeSet::new(),
        }
    }
}

fn default_approving_review_count() -> u8 {
    MIN_APPROVING_REVIEW_COUNT
}

/// Users and teams allowed to push to a protected branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PushRestrictions {
    #[serde(default)]
    pub users: BTreeSet<String>,

    /// Team slugs
    #[serde(default)]
    pub teams: BTreeSet<String>,
}

impl ProtectionPolicy {
    /// Converts the policy into the payload of the GitHub "update branch protection"
    /// endpoint.
    ///
    /// Sections missing from the policy are sent as `null`, which removes them from the
    /// branch. Empty dismissal lists are omitted entirely because GitHub only accepts
    /// them for organization repositories.
    pub fn to_protection_update(&self) -> BranchProtectionUpdate {
        BranchProtectionUpdate {
            required_status_checks: self.required_status_checks.as_ref().map(|checks| {
                StatusChecksUpdate {
                    strict: checks.strict,
                    contexts: checks.contexts.clone(),
                }
            }),
            enforce_admins: self.enforce_admins,
            required_pull_request_reviews: self.required_pull_request_reviews.as_ref().map(
                |reviews| {
                    let dismissal_restrictions = if reviews.dismissal_users.is_empty()
                        && reviews.dismissal_teams.is_empty()
                    {
                        None
                    } else {
                        Some(RestrictionsUpdate {
                            users: reviews.dismissal_users.iter().cloned().collect(),
                            teams: reviews.dismissal_teams.iter().cloned().collect(),
                        })
                    };

                    PullRequestReviewsUpdate {
                        dismiss_stale_reviews: reviews.dismiss_stale_reviews,
                        require_code_owner_reviews: reviews.require_code_owner_reviews,
                        required_approving_review_count: u32::from(
                            reviews.required_approving_review_count,
                        ),
                        dismissal_restrictions,
                    }
                },
            ),
            restrictions: self
                .restrictions
                .as_ref()
                .map(|restrictions| RestrictionsUpdate {
                    users: restrictions.users.iter().cloned().collect(),
                    teams: restrictions.teams.iter().cloned().collect(),
                }),
        }
    }
}

impl From<&BranchProtection> for ProtectionPolicy {
    fn from(protection: &BranchProtection) -> Self {
        Self {
            required_status_checks: protection.required_status_checks.as_ref().map(|checks| {
                RequiredStatusChecks {
                    strict: checks.strict,
                    contexts: checks.contexts.clone(),
                }
            }),
            required_pull_request_reviews: protection.required_pull_request_reviews.as_ref().map(
                |reviews| {
                    let (dismissal_users, dismissal_teams) = reviews
                        .dismissal_restrictions
                        .as_ref()
                        .map(|r| {
                            (
                                r.users.iter().map(|u| u.login.clone()).collect(),
                                r.teams.iter().map(|t| t.slug.clone()).collect(),
                            )
                        })
                        .unwrap_or_default();

                    RequiredPullRequestReviews {
                        require_code_owner_reviews: reviews.require_code_owner_reviews,
                        dismiss_stale_reviews: reviews.dismiss_stale_reviews,
                        required_approving_review_count: u8::try_from(
                            reviews.required_approving_review_count,
                        )
                        .unwrap_or(u8::MAX),
                        dismissal_users,
                        dismissal_teams,
                    }
                },
            ),
            enforce_admins: protection
                .enforce_admins
                .as_ref()
                .is_some_and(|setting| setting.enabled),
            restrictions: protection
                .restrictions
                .as_ref()
                .map(|restrictions| PushRestrictions {
                    users: restrictions.users.iter().map(|u| u.login.clone()).collect(),
                    teams: restrictions.teams.iter().map(|t| t.slug.clone()).collect(),
                }),
        }
    }
}

/// The branches of one repository at one point in time, in listing order.
///
/// Branch names are expected to be unique; the desired-state loader rejects files that
/// repeat a name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct StateSnapshot(Vec<BranchRecord>);

impl StateSnapshot {
    pub fn new(branches: Vec<BranchRecord>) -> Self {
        Self(branches)
    }

    /// Looks up a branch by name.
    pub fn get(&self, name: &str) -> Option<&BranchRecord> {
        self.0.iter().find(|b| b.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BranchRecord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of branches carrying a protection policy.
    pub fn protected_count(&self) -> usize {
        self.0.iter().filter(|b| b.protection.is_some()).count()
    }
}

impl From<Vec<BranchRecord>> for StateSnapshot {
    fn from(branches: Vec<BranchRecord>) -> Self {
        Self(branches)
    }
}

impl FromIterator<BranchRecord> for StateSnapshot {
    fn from_iter<I: IntoIterator<Item = BranchRecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a StateSnapshot {
    type Item = &'a BranchRecord;
    type IntoIter = std::slice::Iter<'a, BranchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
