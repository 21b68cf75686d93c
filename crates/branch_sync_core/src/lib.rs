//! # Branch Sync Core
//!
//! Reconciles the branch protection of many GitHub repositories against a single
//! desired state.
//!
//! ## Overview
//!
//! A sync run:
//! 1. discovers the target repositories ([`discover_targets`])
//! 2. fetches the live state of each target ([`fetch_snapshot`])
//! 3. diffs it against the desired state ([`compare`])
//! 4. applies the changes ([`Applier`]) and records every attempt in the [`AuditLog`]
//!
//! [`SyncOrchestrator`] drives steps 2 to 4 and aggregates the outcome in a
//! [`SyncSummary`].
//!
//! ## Error Handling
//!
//! Setup failures such as an unreachable GitHub API during discovery or an audit log
//! that cannot be created are returned as [`SyncError`]. Failures of individual changes
//! never surface as errors; they are counted in the summary and written to the audit log.

pub mod applier;
pub mod audit;
pub mod comparator;
pub mod discovery;
pub mod errors;
pub mod orchestrator;
pub mod remote;
pub mod target;

#[cfg(test)]
mod test_support;

pub use applier::Applier;
pub use audit::{AuditAction, AuditLog, AuditRecord, AuditStatus, BRANCH_PROTECTION_SETTING};
pub use comparator::{compare, Addition, ChangeSet, Deletion, Modification};
pub use discovery::discover_targets;
pub use errors::{SyncError, SyncResult};
pub use orchestrator::{SyncOptions, SyncOrchestrator, SyncSummary, TargetReport};
pub use remote::fetch_snapshot;
pub use target::TargetRepository;
