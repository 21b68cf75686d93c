//! Configuration management for the branch-sync CLI.
//!
//! The configuration is stored in TOML format, by default in `branch-sync.toml` in the
//! current directory. Every section and field is optional; missing values fall back to
//! the defaults below.
//!
//! ```toml
//! [sync]
//! target_topic = "managed-protection"
//! stop_on_error = false
//! max_concurrent_targets = 1
//!
//! [paths]
//! settings_file = "settings/branch-protection.json"
//! logs_dir = "logs"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use config_manager::DEFAULT_SETTINGS_FILE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "branch-sync.toml";

/// Topic that marks a repository as managed when none is configured
pub const DEFAULT_TARGET_TOPIC: &str = "managed-protection";

/// Directory audit logs are written to when none is configured
pub const DEFAULT_LOGS_DIR: &str = "logs";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Main configuration structure for the branch-sync CLI application.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist, cannot be read, or does not
    /// match the configuration structure.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::path::Path;
    /// use branch_sync_cli::config::AppConfig;
    ///
    /// match AppConfig::load(Path::new("./branch-sync.toml")) {
    ///     Ok(config) => println!("Target topic: {}", config.sync.target_topic),
    ///     Err(e) => eprintln!("Failed to load config: {}", e),
    /// }
    /// ```
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration file: {}", e)))?;

        Ok(config)
    }

    /// Loads the configuration at `path`, or the defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, Error> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No configuration file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }
}

/// Settings of the reconcile loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Repositories tagged with this topic are synced
    #[serde(default = "SyncConfig::default_target_topic")]
    pub target_topic: String,

    /// Abort the run after the first failed change
    #[serde(default)]
    pub stop_on_error: bool,

    /// Number of repositories processed at the same time
    #[serde(default = "SyncConfig::default_max_concurrent_targets")]
    pub max_concurrent_targets: usize,
}

impl SyncConfig {
    fn default_target_topic() -> String {
        DEFAULT_TARGET_TOPIC.to_string()
    }

    fn default_max_concurrent_targets() -> usize {
        1
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            target_topic: Self::default_target_topic(),
            stop_on_error: false,
            max_concurrent_targets: Self::default_max_concurrent_targets(),
        }
    }
}

/// File locations used by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Desired-state file
    #[serde(default = "PathsConfig::default_settings_file")]
    pub settings_file: PathBuf,

    /// Directory for the per-run audit logs
    #[serde(default = "PathsConfig::default_logs_dir")]
    pub logs_dir: PathBuf,
}

impl PathsConfig {
    fn default_settings_file() -> PathBuf {
        PathBuf::from(DEFAULT_SETTINGS_FILE)
    }

    fn default_logs_dir() -> PathBuf {
        PathBuf::from(DEFAULT_LOGS_DIR)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            settings_file: Self::default_settings_file(),
            logs_dir: Self::default_logs_dir(),
        }
    }
}

/// Resolves the path to the configuration file.
///
/// - If `config_path` is `Some(path)`, returns that path
/// - Otherwise returns `./branch-sync.toml` in the current directory
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}

/// Loads the configuration a command runs with.
///
/// An explicitly given file must exist; the default file is optional.
pub fn load_app_config(config_path: Option<&str>) -> Result<AppConfig, Error> {
    let path = get_config_path(config_path);
    if config_path.is_some() {
        AppConfig::load(&path)
    } else {
        AppConfig::load_or_default(&path)
    }
}
