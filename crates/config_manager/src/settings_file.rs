//! Loading and saving the desired-state settings file.
//!
//! The file is a JSON array of branch records:
//!
//! ```json
//! [
//!   {
//!     "name": "main",
//!     "protection": {
//!       "required_status_checks": { "strict": true, "contexts": ["ci/build"] },
//!       "required_pull_request_reviews": { "required_approving_review_count": 2 },
//!       "enforce_admins": true,
//!       "restrictions": null
//!     }
//!   }
//! ]
//! ```
//!
//! Loading runs the schema check first and the business rules second. A file that fails
//! either is rejected as a whole.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::policy::StateSnapshot;
use crate::schema::SchemaValidator;
use crate::validator::{validate_snapshot, ValidationError, ValidationErrorType, ValidationResult};

#[cfg(test)]
#[path = "settings_file_tests.rs"]
mod tests;

/// Default location of the desired-state file, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "settings/branch-protection.json";

/// Reads, validates and parses the desired-state file at `path`.
///
/// # Errors
///
/// - `FileNotFound` when the file does not exist
/// - `FileAccessError` when it cannot be read
/// - `ParseError` when it is not JSON
/// - `ValidationFailed` when it breaks the schema or a business rule
pub fn load_desired_state(path: &Path) -> ConfigurationResult<StateSnapshot> {
    debug!(path = %path.display(), "Loading desired state");

    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigurationError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => ConfigurationError::FileAccessError {
            path: path.display().to_string(),
            reason: e.to_string(),
        },
    })?;

    let snapshot = parse_desired_state(&content)?;
    info!(
        path = %path.display(),
        branches = snapshot.len(),
        protected = snapshot.protected_count(),
        "Loaded desired state"
    );

    Ok(snapshot)
}

/// Parses and validates a desired-state document held in memory.
pub fn parse_desired_state(content: &str) -> ConfigurationResult<StateSnapshot> {
    let document: Value =
        serde_json::from_str(content).map_err(|e| ConfigurationError::ParseError {
            reason: e.to_string(),
        })?;

    let result = validate_desired_state(&document)?;
    for warning in &result.warnings {
        warn!(field = %warning.field_path, "{}", warning.message);
    }
    if !result.is_valid() {
        return Err(ConfigurationError::ValidationFailed {
            error_count: result.errors.len(),
            errors: result.errors,
        });
    }

    serde_json::from_value(document).map_err(|e| ConfigurationError::ParseError {
        reason: e.to_string(),
    })
}

/// Checks a desired-state document against the schema and the business rules.
///
/// Every problem is collected; the business rules only run once the document matches
/// the schema. The returned error is reserved for failures of the validation machinery
/// itself.
pub fn validate_desired_state(document: &Value) -> ConfigurationResult<ValidationResult> {
    let validator = SchemaValidator::new().map_err(|e| ConfigurationError::SchemaUnavailable {
        reason: e.to_string(),
    })?;

    let mut result = ValidationResult::new();
    result.add_errors(validator.validate(document));
    if !result.is_valid() {
        return Ok(result);
    }

    match serde_json::from_value::<StateSnapshot>(document.clone()) {
        Ok(snapshot) => {
            let rules = validate_snapshot(&snapshot);
            result.add_errors(rules.errors);
            result.add_warnings(rules.warnings);
        }
        Err(e) => result.add_error(ValidationError {
            error_type: ValidationErrorType::SchemaViolation,
            field_path: "branches".to_string(),
            message: e.to_string(),
            suggestion: None,
        }),
    }

    Ok(result)
}

/// Writes `snapshot` to `path` as pretty-printed JSON, creating parent directories.
pub fn save_desired_state(path: &Path, snapshot: &StateSnapshot) -> ConfigurationResult<()> {
    let access_error = |e: std::io::Error| ConfigurationError::FileAccessError {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(access_error)?;
    }

    let mut content =
        serde_json::to_string_pretty(snapshot).map_err(|e| ConfigurationError::ParseError {
            reason: e.to_string(),
        })?;
    content.push('\n');

    std::fs::write(path, content).map_err(access_error)?;
    info!(
        path = %path.display(),
        branches = snapshot.len(),
        "Saved desired state"
    );

    Ok(())
}
