//! The `validate` command: checks a desired-state file without contacting GitHub.
//!
//! Every problem is listed, not only the first one. The command fails when the file has
//! errors; warnings are printed but do not fail it.

use std::path::{Path, PathBuf};

use clap::Args;
use colored::Colorize;
use config_manager::{validate_desired_state, ValidationResult};
use tracing::instrument;

use crate::config::load_app_config;
use crate::errors::Error;

#[cfg(test)]
#[path = "validate_cmd_tests.rs"]
mod tests;

/// Arguments of the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Desired-state file to check (defaults to the configured settings file)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Path to the configuration file (defaults to ./branch-sync.toml)
    #[arg(long)]
    pub config: Option<String>,
}

#[instrument]
pub async fn execute(args: &ValidateArgs) -> Result<(), Error> {
    let file = match &args.file {
        Some(file) => file.clone(),
        None => load_app_config(args.config.as_deref())?.paths.settings_file,
    };

    let result = validate_file(&file)?;
    print!("{}", format_validation_result(&file, &result));

    if result.is_valid() {
        Ok(())
    } else {
        Err(Error::DesiredState(format!(
            "{} has {} error(s)",
            file.display(),
            result.errors.len()
        )))
    }
}

/// Reads `path` and collects every schema and business rule problem.
///
/// # Errors
///
/// Returns `Error::DesiredState` when the file cannot be read or is not JSON.
pub fn validate_file(path: &Path) -> Result<ValidationResult, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::DesiredState(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let document: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        Error::DesiredState(format!("{} is not valid JSON: {}", path.display(), e))
    })?;

    validate_desired_state(&document).map_err(|e| Error::DesiredState(e.to_string()))
}

pub fn format_validation_result(path: &Path, result: &ValidationResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} {}\n\n",
        "Validating".bold(),
        path.display().to_string().bright_cyan()
    ));

    if result.is_valid() {
        output.push_str(&format!("{}\n", "✓ Desired state is VALID".green().bold()));
    } else {
        output.push_str(&format!(
            "{}\n\n",
            "✗ Desired state validation FAILED".red().bold()
        ));
        output.push_str(&format!("{}:\n", "Errors".red().bold()));
        for error in &result.errors {
            output.push_str(&format!("  {} {}\n", "✗".red(), error));
        }
    }

    if !result.warnings.is_empty() {
        output.push_str(&format!("\n{}:\n", "Warnings".yellow().bold()));
        for warning in &result.warnings {
            output.push_str(&format!(
                "  {} {}: {}\n",
                "⚠".yellow(),
                warning.field_path,
                warning.message
            ));
        }
    }

    output
}
