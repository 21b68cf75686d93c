//! Errors raised by the sync engine.
//!
//! Only setup failures surface as [`SyncError`]. Failures of individual changes are
//! absorbed by the applier and reported as counts.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to discover target repositories: {0}")]
    Discovery(#[source] github_client::Error),

    #[error("Failed to open audit log at {path}: {source}")]
    AuditLog {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid repository name '{0}', expected OWNER/NAME")]
    InvalidTarget(String),
}

pub type SyncResult<T> = Result<T, SyncError>;
