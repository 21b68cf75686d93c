//! Diff between a desired and an actual branch protection snapshot.
//!
//! [`compare`] is a pure function. Only the presence and value of a branch's protection
//! drive change detection; a branch that merely exists on one side without a policy never
//! produces a change.
//!
//! Branches that exist only on the live repository and carry no protection are left
//! alone. The engine reconciles declared branches and retires stale protections; it does
//! not manage branches outside the declared set.

use std::collections::HashMap;

use config_manager::{BranchRecord, ProtectionPolicy, StateSnapshot};
use serde::Serialize;

#[cfg(test)]
#[path = "comparator_tests.rs"]
mod tests;

/// A branch that is declared with a policy but missing from the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Addition {
    pub branch: String,
    pub protection: ProtectionPolicy,
}

/// A branch whose live protection differs from the declared one.
///
/// `old` is the live value and `new` the declared value. Either may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modification {
    pub branch: String,
    pub old: Option<ProtectionPolicy>,
    pub new: Option<ProtectionPolicy>,
}

/// A protected branch that exists only on the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deletion {
    pub branch: String,
    pub protection: ProtectionPolicy,
}

/// The changes needed to converge one repository to the desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub additions: Vec<Addition>,
    pub modifications: Vec<Modification>,
    pub deletions: Vec<Deletion>,
    pub has_changes: bool,
}

impl ChangeSet {
    /// Total number of changes across all three categories.
    pub fn change_count(&self) -> usize {
        self.additions.len() + self.modifications.len() + self.deletions.len()
    }
}

/// Computes the changes that turn `actual` into `desired`.
///
/// Additions and modifications follow the order of `desired`, deletions the order of
/// `actual`.
///
/// # Examples
///
/// ```rust
/// use branch_sync_core::compare;
/// use config_manager::{BranchRecord, ProtectionPolicy, StateSnapshot};
///
/// let desired = StateSnapshot::new(vec![BranchRecord::protected(
///     "main",
///     ProtectionPolicy { enforce_admins: true, ..Default::default() },
/// )]);
///
/// let changes = compare(&desired, &StateSnapshot::default());
/// assert!(changes.has_changes);
/// assert_eq!(changes.additions[0].branch, "main");
/// ```
pub fn compare(desired: &StateSnapshot, actual: &StateSnapshot) -> ChangeSet {
    let desired_by_name = index_by_name(desired);
    let actual_by_name = index_by_name(actual);

    let mut changes = ChangeSet::default();

    for branch in desired.iter() {
        match actual_by_name.get(branch.name.as_str()) {
            None => {
                if let Some(protection) = &branch.protection {
                    changes.additions.push(Addition {
                        branch: branch.name.clone(),
                        protection: protection.clone(),
                    });
                }
            }
            Some(live) => {
                if live.protection != branch.protection {
                    changes.modifications.push(Modification {
                        branch: branch.name.clone(),
                        old: live.protection.clone(),
                        new: branch.protection.clone(),
                    });
                }
            }
        }
    }

    for branch in actual.iter() {
        if desired_by_name.contains_key(branch.name.as_str()) {
            continue;
        }
        if let Some(protection) = &branch.protection {
            changes.deletions.push(Deletion {
                branch: branch.name.clone(),
                protection: protection.clone(),
            });
        }
    }

    changes.has_changes = changes.change_count() > 0;
    changes
}

fn index_by_name(snapshot: &StateSnapshot) -> HashMap<&str, &BranchRecord> {
    snapshot.iter().map(|b| (b.name.as_str(), b)).collect()
}
