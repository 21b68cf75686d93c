//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when interacting with the GitHub API
//! through the github_client crate. Callers that need a plain message (for example to record
//! it in an audit trail) can rely on the `Display` implementation of [`Error`].

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// Each variant corresponds to a class of failure reported by the GitHub REST API or by
/// the HTTP transport underneath it.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.delete_branch_protection("org", "repo", "main").await {
///     Ok(()) => println!("Protection removed"),
///     Err(Error::NotFound) => println!("Branch was not protected"),
///     Err(Error::RateLimitExceeded) => eprintln!("Rate limit exceeded, retry later"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// GitHub rejected the request.
    ///
    /// Carries the HTTP status code and the message GitHub returned, e.g. a validation
    /// failure on a branch protection payload.
    #[error("GitHub API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Authentication or GitHub client initialization failure.
    ///
    /// This error occurs when:
    /// - The personal access token is invalid or expired
    /// - The octocrab client cannot be built
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Error deserializing the response from GitHub.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The GitHub API returned a response in an unexpected format.
    #[error("Invalid response format")]
    InvalidResponse,

    /// The requested resource was not found.
    ///
    /// This error occurs when a GitHub API request returns a 404 status code,
    /// indicating that the requested resource (repository, branch, protection rule)
    /// does not exist or is not accessible with the current authentication.
    #[error("Resource not found")]
    NotFound,

    /// GitHub API rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The request never produced a GitHub response (connection, URI or TLS problems).
    #[error("Failed to reach GitHub: {0}")]
    Transport(String),
}
