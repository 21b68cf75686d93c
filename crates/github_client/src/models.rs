//! # Models
//!
//! This module contains the repository, branch and user models returned by the GitHub
//! REST API endpoints this crate talks to.
//!
//! Only the fields needed to discover repositories and enumerate their branches are
//! modelled; everything else in the GitHub payloads is ignored during deserialization.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Represents a GitHub user account.
///
/// # Examples
///
/// ```rust
/// use github_client::models::User;
///
/// let user = User {
///     id: 12345,
///     login: "octocat".to_string(),
/// };
///
/// println!("User: {} (ID: {})", user.login, user.id);
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct User {
    /// The unique numeric ID of the user
    pub id: u64,
    /// The login name of the user
    pub login: String,
}

/// Permissions the authenticated user holds on a repository.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RepositoryPermissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub maintain: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

/// Represents a GitHub repository as listed by `GET /user/repos`.
///
/// # Examples
///
/// ```rust
/// use github_client::models::{Repository, RepositoryPermissions, User};
///
/// let repo = Repository {
///     name: "my-repo".to_string(),
///     full_name: "my-org/my-repo".to_string(),
///     owner: User { id: 1, login: "my-org".to_string() },
///     topics: vec!["managed".to_string()],
///     permissions: Some(RepositoryPermissions { admin: true, ..Default::default() }),
///     archived: false,
/// };
///
/// assert!(repo.has_topic("managed"));
/// assert!(repo.is_admin());
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Repository {
    /// The name of the repository
    pub name: String,
    /// The full name of the repository (owner/name)
    pub full_name: String,
    /// The account owning the repository
    pub owner: User,
    /// Topics attached to the repository
    #[serde(default)]
    pub topics: Vec<String>,
    /// Permissions of the authenticated user, absent for anonymous requests
    #[serde(default)]
    pub permissions: Option<RepositoryPermissions>,
    /// Whether the repository is archived (read-only)
    #[serde(default)]
    pub archived: bool,
}

impl Repository {
    /// Returns true if the repository is tagged with `topic`.
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }

    /// Returns true if the authenticated user has admin access to the repository.
    pub fn is_admin(&self) -> bool {
        self.permissions.as_ref().is_some_and(|p| p.admin)
    }
}

/// Represents a branch as listed by `GET /repos/{owner}/{repo}/branches`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Branch {
    /// Branch name
    pub name: String,
    /// Whether GitHub reports the branch as protected
    #[serde(default)]
    pub protected: bool,
}
