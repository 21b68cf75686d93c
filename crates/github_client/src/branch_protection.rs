//! Branch protection domain types.
//!
//! This module contains the wire types of the GitHub branch protection endpoints:
//!
//! - [`BranchProtection`] is the body returned by
//!   `GET /repos/{owner}/{repo}/branches/{branch}/protection`
//! - [`BranchProtectionUpdate`] is the body sent to
//!   `PUT /repos/{owner}/{repo}/branches/{branch}/protection`
//!
//! The two shapes differ: GitHub reports users and teams as objects and wraps
//! `enforce_admins` in an object, while the update endpoint takes plain logins, slugs and
//! booleans.
//!
//! See: https://docs.github.com/en/rest/branches/branch-protection

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "branch_protection_tests.rs"]
mod tests;

/// Branch protection as reported by GitHub.
///
/// Sections that are not configured on the branch are absent from the response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BranchProtection {
    #[serde(default)]
    pub required_status_checks: Option<StatusChecks>,

    #[serde(default)]
    pub required_pull_request_reviews: Option<PullRequestReviews>,

    #[serde(default)]
    pub enforce_admins: Option<EnabledSetting>,

    #[serde(default)]
    pub restrictions: Option<Restrictions>,
}

/// Required status checks section of a protection response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusChecks {
    /// Require branches to be up to date before merging
    #[serde(default)]
    pub strict: bool,

    /// Names of the required checks
    #[serde(default)]
    pub contexts: Vec<String>,
}

/// Required pull request reviews section of a protection response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PullRequestReviews {
    #[serde(default)]
    pub dismiss_stale_reviews: bool,

    #[serde(default)]
    pub require_code_owner_reviews: bool,

    #[serde(default)]
    pub required_approving_review_count: u32,

    /// Who may dismiss reviews. Only present for organization repositories.
    #[serde(default)]
    pub dismissal_restrictions: Option<Restrictions>,
}

/// A `{ "enabled": bool }` wrapper used by several protection settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct EnabledSetting {
    #[serde(default)]
    pub enabled: bool,
}

/// Users and teams referenced by push or dismissal restrictions.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Restrictions {
    #[serde(default)]
    pub users: Vec<UserRef>,

    #[serde(default)]
    pub teams: Vec<TeamRef>,
}

/// A user reference inside a protection response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserRef {
    pub login: String,
}

/// A team reference inside a protection response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TeamRef {
    pub slug: String,
}

/// Payload for replacing the protection of a branch.
///
/// GitHub requires all four top-level keys to be present; `None` sections are sent as
/// `null`, which disables that part of the protection.
///
/// # Examples
///
/// ```rust
/// use github_client::{BranchProtectionUpdate, PullRequestReviewsUpdate};
///
/// let update = BranchProtectionUpdate {
///     required_status_checks: None,
///     enforce_admins: true,
///     required_pull_request_reviews: Some(PullRequestReviewsUpdate {
///         dismiss_stale_reviews: true,
///         require_code_owner_reviews: false,
///         required_approving_review_count: 2,
///         dismissal_restrictions: None,
///     }),
///     restrictions: None,
/// };
///
/// let body = serde_json::to_value(&update).unwrap();
/// assert!(body["restrictions"].is_null());
/// ```
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct BranchProtectionUpdate {
    pub required_status_checks: Option<StatusChecksUpdate>,
    pub enforce_admins: bool,
    pub required_pull_request_reviews: Option<PullRequestReviewsUpdate>,
    pub restrictions: Option<RestrictionsUpdate>,
}

/// Required status checks section of an update payload.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct StatusChecksUpdate {
    pub strict: bool,
    pub contexts: Vec<String>,
}

/// Required pull request reviews section of an update payload.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct PullRequestReviewsUpdate {
    pub dismiss_stale_reviews: bool,
    pub require_code_owner_reviews: bool,
    pub required_approving_review_count: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissal_restrictions: Option<RestrictionsUpdate>,
}

/// Users (logins) and teams (slugs) for push or dismissal restrictions.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct RestrictionsUpdate {
    pub users: Vec<String>,
    pub teams: Vec<String>,
}
