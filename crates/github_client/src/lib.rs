//! Crate for interacting with the GitHub REST API.
//!
//! This crate provides a client for making authenticated requests to GitHub with a
//! personal access token. It covers the small part of the API needed to reconcile
//! branch protection: the authenticated user, the repositories visible to that user,
//! the branches of a repository and the protection attached to a branch.
//!
//! All operations are exposed through the [`RepositoryClient`] trait so that callers can
//! substitute their own implementation in tests.

use async_trait::async_trait;
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, instrument};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod branch_protection;
pub use branch_protection::{
    BranchProtection, BranchProtectionUpdate, EnabledSetting, PullRequestReviews,
    PullRequestReviewsUpdate, Restrictions, RestrictionsUpdate, StatusChecks, StatusChecksUpdate,
    TeamRef, UserRef,
};

pub mod models;
pub use models::{Branch, Repository, RepositoryPermissions, User};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Number of items requested per page from list endpoints. GitHub caps this at 100.
const PAGE_SIZE: u8 = 100;

/// Affiliations used when listing the repositories of the authenticated user.
const REPOSITORY_AFFILIATION: &str = "owner,collaborator,organization_member";

/// A client for interacting with the GitHub API.
#[derive(Debug)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` from an already configured `Octocrab` instance.
    ///
    /// Use [`create_token_client`] to build an instance authenticated with a personal
    /// access token.
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Fetches every page of a list endpoint.
    ///
    /// Pages are requested until GitHub returns fewer than [`PAGE_SIZE`] items.
    async fn get_all_pages<T>(
        &self,
        route: &str,
        affiliation: Option<&str>,
    ) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned + Send,
    {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let parameters = PageParameters {
                per_page: PAGE_SIZE,
                page,
                affiliation,
            };

            let batch: Vec<T> = self
                .client
                .get(route, Some(&parameters))
                .await
                .map_err(|e| map_octocrab_error("Failed to list items", e))?;

            let count = batch.len();
            debug!(route = route, page = page, count = count, "Retrieved page");
            items.extend(batch);

            if count < PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

#[derive(Debug, Serialize)]
struct PageParameters<'a> {
    per_page: u8,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    affiliation: Option<&'a str>,
}

#[async_trait]
impl RepositoryClient for GitHubClient {
    #[instrument(skip(self))]
    async fn get_authenticated_user(&self) -> Result<User, Error> {
        let user: User = self
            .client
            .get("/user", None::<&()>)
            .await
            .map_err(|e| map_octocrab_error("Failed to get the authenticated user", e))?;

        info!(login = user.login, "Authenticated with GitHub");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_user_repositories(&self) -> Result<Vec<Repository>, Error> {
        let repositories: Vec<Repository> = self
            .get_all_pages("/user/repos", Some(REPOSITORY_AFFILIATION))
            .await?;

        info!(
            count = repositories.len(),
            "Retrieved repositories for the authenticated user"
        );
        Ok(repositories)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>, Error> {
        let route = format!("/repos/{}/{}/branches", owner, repo);
        let branches: Vec<Branch> = self.get_all_pages(&route, None).await?;

        debug!(count = branches.len(), "Retrieved branches");
        Ok(branches)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo, branch = %branch))]
    async fn get_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>, Error> {
        let route = protection_route(owner, repo, branch)?;
        let result: octocrab::Result<BranchProtection> =
            self.client.get(route, None::<&()>).await;

        match result {
            Ok(protection) => Ok(Some(protection)),
            Err(e) => match map_octocrab_error("Failed to get branch protection", e) {
                // GitHub answers 404 "Branch not protected" for unprotected branches.
                Error::NotFound => Ok(None),
                other => Err(other),
            },
        }
    }

    #[instrument(skip(self, protection), fields(owner = %owner, repo = %repo, branch = %branch))]
    async fn update_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        protection: &BranchProtectionUpdate,
    ) -> Result<(), Error> {
        let route = protection_route(owner, repo, branch)?;
        let _: serde_json::Value = self
            .client
            .put(route, Some(protection))
            .await
            .map_err(|e| map_octocrab_error("Failed to update branch protection", e))?;

        info!("Updated branch protection");
        Ok(())
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo, branch = %branch))]
    async fn delete_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<(), Error> {
        let uri = http::Uri::builder()
            .path_and_query(protection_route(owner, repo, branch)?)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        let response = self
            .client
            ._delete(uri, None::<&()>)
            .await
            .map_err(|e| map_octocrab_error("Failed to delete branch protection", e))?;
        octocrab::map_github_error(response)
            .await
            .map_err(|e| map_octocrab_error("Failed to delete branch protection", e))?;

        info!("Removed branch protection");
        Ok(())
    }
}

/// Trait for the repository and branch operations needed to reconcile branch protection.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Returns the user the client is authenticated as.
    ///
    /// # Errors
    /// Returns `Error::AuthError` if the token is rejected.
    async fn get_authenticated_user(&self) -> Result<User, Error>;

    /// Lists every repository the authenticated user owns, collaborates on or can see
    /// through organization membership, including topics and permissions.
    async fn list_user_repositories(&self) -> Result<Vec<Repository>, Error>;

    /// Lists every branch of a repository.
    ///
    /// # Arguments
    ///
    /// * `owner` - The owner of the repository (user or organization name).
    /// * `repo` - The name of the repository.
    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>, Error>;

    /// Reads the protection of a branch.
    ///
    /// Returns `Ok(None)` when the branch is not protected.
    ///
    /// # Errors
    /// Returns an error for any failure other than "not protected", e.g. missing
    /// permissions or rate limiting.
    async fn get_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>, Error>;

    /// Replaces the protection of a branch.
    ///
    /// # Errors
    /// Returns the error GitHub reported, e.g. `Error::ApiError` with status 422 when the
    /// payload is rejected.
    async fn update_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        protection: &BranchProtectionUpdate,
    ) -> Result<(), Error>;

    /// Removes the protection of a branch.
    async fn delete_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<(), Error>;
}

/// Creates an `Octocrab` client authenticated with a personal access token.
///
/// # Errors
/// Returns `Error::AuthError` if the client cannot be built.
///
/// # Example
///
/// ```rust,no_run
/// use github_client::{create_token_client, GitHubClient};
/// use secrecy::SecretString;
///
/// let token = SecretString::from("ghp_example".to_string());
/// let client = GitHubClient::new(create_token_client(&token).unwrap());
/// ```
#[instrument(skip(token))]
pub fn create_token_client(token: &SecretString) -> Result<Octocrab, Error> {
    Octocrab::builder()
        .personal_token(token.expose_secret().to_string())
        .build()
        .map_err(|e| {
            error!(error = ?e, "Failed to build Octocrab client with personal token");
            Error::AuthError("Failed to build a GitHub client for the token".to_string())
        })
}

/// Path of the protection endpoint of `branch`.
///
/// Each branch segment is percent-encoded so that names such as `fix#1` or `100%` reach
/// the right endpoint. Slashes are kept as segment separators.
fn protection_route(owner: &str, repo: &str, branch: &str) -> Result<String, Error> {
    let mut url = Url::parse("https://api.github.com/")
        .map_err(|e| Error::Transport(format!("Failed to build the request URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::Transport("Failed to build the request URL".to_string()))?
        .clear()
        .extend(["repos", owner, repo, "branches"])
        .extend(branch.split('/'))
        .push("protection");

    Ok(url.path().to_string())
}

/// Converts an octocrab error into an [`Error`], logging the details.
fn map_octocrab_error(message: &str, e: octocrab::Error) -> Error {
    let mapped = match &e {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            match status {
                401 => Error::AuthError(source.message.clone()),
                403 | 429 if source.message.to_lowercase().contains("rate limit") => {
                    Error::RateLimitExceeded
                }
                404 => Error::NotFound,
                _ => Error::ApiError {
                    status,
                    message: source.message.clone(),
                },
            }
        }
        octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => Error::InvalidResponse,
        other => Error::Transport(other.to_string()),
    };

    log_octocrab_error(message, e);
    mapped
}

fn log_octocrab_error(message: &str, e: octocrab::Error) {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            let err = source;
            // A missing protection is an expected answer, not an error worth shouting about.
            if err.status_code.as_u16() == 404 {
                debug!(
                    error_message = err.message,
                    "{}. GitHub reported the resource as not found",
                    message
                );
            } else {
                error!(
                    error_message = err.message,
                    status = err.status_code.as_u16(),
                    "{}. Received an error from GitHub",
                    message
                );
            }
        }
        octocrab::Error::UriParse { source, .. } => error!(
            error_message = source.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::Uri { source, .. } => error!(
            error_message = source.to_string(),
            "{}, Failed to parse URI.",
            message
        ),
        octocrab::Error::InvalidHeaderValue { source, .. } => error!(
            error_message = source.to_string(),
            "{}. One of the header values was invalid.",
            message
        ),
        octocrab::Error::InvalidUtf8 { source, .. } => error!(
            error_message = source.to_string(),
            "{}. The message wasn't valid UTF-8.",
            message,
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}
