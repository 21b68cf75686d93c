//! Target repository handle.

use std::fmt;
use std::str::FromStr;

use github_client::Repository;
use serde::{Deserialize, Serialize};

use crate::errors::SyncError;

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;

/// A repository whose branches are reconciled.
///
/// Displayed as `owner/name`, which is also the name written to the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRepository {
    pub owner: String,
    pub name: String,
}

impl TargetRepository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for TargetRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for TargetRepository {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(SyncError::InvalidTarget(s.to_string())),
        }
    }
}

impl From<&Repository> for TargetRepository {
    fn from(repo: &Repository) -> Self {
        Self::new(repo.owner.login.clone(), repo.name.clone())
    }
}
