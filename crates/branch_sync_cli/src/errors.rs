use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the branch-sync CLI application.
///
/// Every variant is a setup failure: the command stops before any branch protection is
/// changed and the process exits with status 1.
#[derive(Error, Debug)]
pub enum Error {
    /// Authentication error occurred while resolving or checking GitHub credentials.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error occurred while loading the TOML configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The desired-state file could not be loaded or failed validation.
    #[error("Invalid desired state: {0}")]
    DesiredState(String),

    /// A GitHub request needed before any change could be made failed.
    #[error("GitHub request failed: {0}")]
    GitHub(String),

    /// Invalid command-line arguments were provided.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No repository carries the target topic with admin access.
    #[error("No repositories found with topic '{topic}' where you have admin access")]
    NoTargets { topic: String },

    /// The audit log for the run could not be created.
    #[error("Failed to create the audit log: {0}")]
    AuditLog(String),

    /// Failed to flush the standard output buffer.
    #[error("Failed to flush the std out buffer.")]
    StdOutFlushFailed,
}
