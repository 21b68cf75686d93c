//! Command modules for the branch-sync CLI.
//!
//! - `auth_cmd`: GitHub credentials
//! - `discover_cmd`: lists the repositories a sync would target
//! - `export_cmd`: writes a repository's live protection to a desired-state file
//! - `sync_cmd`: reconciles the target repositories with the desired state
//! - `validate_cmd`: checks a desired-state file

pub mod auth_cmd;
pub mod discover_cmd;
pub mod export_cmd;
pub mod sync_cmd;
pub mod validate_cmd;
