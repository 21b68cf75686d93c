//! Append-only audit log of the changes a sync run attempted.
//!
//! One log file is created per run, named after the time the run started
//! (`sync_YYYYMMDD_HHMMSS.jsonl`, with a `_N` suffix when that name is taken). Each attempted change becomes exactly one JSON object
//! on its own line. Lines are never rewritten.
//!
//! The log owns a single file handle for its lifetime. Appends are serialized behind a
//! mutex so the log can be shared by concurrently processed targets.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::{SyncError, SyncResult};

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;

/// Setting type recorded for every branch protection change.
pub const BRANCH_PROTECTION_SETTING: &str = "branch_protection";

/// Highest suffix tried before giving up on finding a free log file name
const MAX_LOG_SEQUENCE: u32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Apply,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Success,
    Error,
}

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Local>,

    /// `owner/name` of the repository the change targeted
    #[serde(rename = "repository")]
    pub resource_name: String,

    pub setting_type: String,
    pub action: AuditAction,
    pub details: Value,
    pub status: AuditStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditRecord {
    pub fn success(resource_name: &str, action: AuditAction, details: Value) -> Self {
        Self {
            timestamp: Local::now(),
            resource_name: resource_name.to_string(),
            setting_type: BRANCH_PROTECTION_SETTING.to_string(),
            action,
            details,
            status: AuditStatus::Success,
            error: None,
        }
    }

    pub fn failure(
        resource_name: &str,
        action: AuditAction,
        details: Value,
        error: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            resource_name: resource_name.to_string(),
            setting_type: BRANCH_PROTECTION_SETTING.to_string(),
            action,
            details,
            status: AuditStatus::Error,
            error: Some(error.into()),
        }
    }
}

/// Run-scoped audit log file.
///
/// # Examples
///
/// ```rust,no_run
/// use branch_sync_core::{AuditAction, AuditLog, AuditRecord};
/// use serde_json::json;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let log = AuditLog::open("logs")?;
/// log.record(&AuditRecord::success(
///     "acme/widgets",
///     AuditAction::Remove,
///     json!({ "branch": "legacy" }),
/// ))?;
/// println!("Audit log: {}", log.path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl AuditLog {
    /// Creates `dir` if needed and opens a new log file named after the current time.
    pub fn open(dir: impl AsRef<Path>) -> SyncResult<Self> {
        Self::create_in(dir.as_ref(), Local::now())
    }

    /// Creates a log file for a run started at `started` that no earlier run owns.
    ///
    /// A run starting within the same second as an existing log gets a numeric suffix,
    /// e.g. `sync_20240309_140507_1.jsonl`.
    fn create_in(dir: &Path, started: DateTime<Local>) -> SyncResult<Self> {
        std::fs::create_dir_all(dir).map_err(|source| SyncError::AuditLog {
            path: dir.display().to_string(),
            source,
        })?;

        let mut sequence = 0;
        loop {
            let path = dir.join(log_file_name(started, sequence));
            match OpenOptions::new().create_new(true).append(true).open(&path) {
                Ok(file) => {
                    debug!(path = %path.display(), "Created audit log");
                    return Ok(Self {
                        path,
                        file: Mutex::new(file),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && sequence < MAX_LOG_SEQUENCE => {
                    sequence += 1;
                }
                Err(source) => {
                    return Err(SyncError::AuditLog {
                        path: path.display().to_string(),
                        source,
                    })
                }
            }
        }
    }

    /// Opens (or appends to) the log file at `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> SyncResult<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SyncError::AuditLog {
                path: path.display().to_string(),
                source,
            })?;

        debug!(path = %path.display(), "Opened audit log");
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record` as a single line and flushes it to disk.
    pub fn record(&self, record: &AuditRecord) -> io::Result<()> {
        let line = serde_json::to_string(record)?;

        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("Failed to lock audit log"))?;

        writeln!(file, "{}", line)?;
        file.flush()
    }
}

/// File name of the log of a run started at `started`.
///
/// `sequence` tells apart runs started within the same second; `0` adds no suffix.
pub fn log_file_name(started: DateTime<Local>, sequence: u32) -> String {
    let stamp = started.format("%Y%m%d_%H%M%S");
    if sequence == 0 {
        format!("sync_{}.jsonl", stamp)
    } else {
        format!("sync_{}_{}.jsonl", stamp, sequence)
    }
}
