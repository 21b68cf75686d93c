//! Business-rule validation of desired-state snapshots.
//!
//! The JSON schema catches structural problems. The rules here cover what the schema
//! cannot express: branch names must be non-empty and unique within a snapshot, and the
//! approving review count must stay inside the range GitHub accepts.
//!
//! # Examples
//!
//! ```rust
//! use config_manager::{validate_snapshot, BranchRecord, StateSnapshot};
//!
//! let snapshot = StateSnapshot::new(vec![
//!     BranchRecord::unprotected("main"),
//!     BranchRecord::unprotected("main"),
//! ]);
//!
//! let result = validate_snapshot(&snapshot);
//! assert!(!result.is_valid());
//! assert_eq!(result.errors[0].field_path, "branches[1].name");
//! ```

use std::collections::HashSet;

use crate::policy::{StateSnapshot, MAX_APPROVING_REVIEW_COUNT, MIN_APPROVING_REVIEW_COUNT};

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

/// Result of validating a desired-state snapshot.
///
/// Validation is considered successful only if no errors are present. Warnings are
/// reported but never block a sync.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Blocking problems.
    pub errors: Vec<ValidationError>,
    /// Non-blocking observations.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    pub fn add_errors(&mut self, errors: Vec<ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn add_warnings(&mut self, warnings: Vec<ValidationWarning>) {
        self.warnings.extend(warnings);
    }
}

/// Individual validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The category of validation error.
    pub error_type: ValidationErrorType,
    /// Path to the field that failed validation, e.g. `branches[0].name`.
    pub field_path: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field_path, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

/// Validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorType {
    /// File structure doesn't match the schema.
    SchemaViolation,
    /// A required field is missing or empty.
    RequiredFieldMissing,
    /// A field value is out of range.
    InvalidValue,
    /// A rule spanning several entries was violated.
    BusinessRuleViolation,
}

impl std::fmt::Display for ValidationErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaViolation => write!(f, "SchemaViolation"),
            Self::RequiredFieldMissing => write!(f, "RequiredFieldMissing"),
            Self::InvalidValue => write!(f, "InvalidValue"),
            Self::BusinessRuleViolation => write!(f, "BusinessRuleViolation"),
        }
    }
}

/// Non-blocking validation warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Path to the field that triggered the warning.
    pub field_path: String,
    /// Human-readable warning message.
    pub message: String,
    /// Optional recommendation.
    pub recommendation: Option<String>,
}

/// Applies the business rules to `snapshot` and collects every problem in one pass.
pub fn validate_snapshot(snapshot: &StateSnapshot) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen = HashSet::new();

    for (index, branch) in snapshot.iter().enumerate() {
        let path = format!("branches[{index}]");

        if branch.name.trim().is_empty() {
            result.add_error(ValidationError {
                error_type: ValidationErrorType::RequiredFieldMissing,
                field_path: format!("{path}.name"),
                message: "Branch name cannot be empty".to_string(),
                suggestion: Some("Set the name of the branch to protect".to_string()),
            });
        } else if !seen.insert(branch.name.as_str()) {
            result.add_error(ValidationError {
                error_type: ValidationErrorType::BusinessRuleViolation,
                field_path: format!("{path}.name"),
                message: format!("Branch '{}' is declared more than once", branch.name),
                suggestion: Some("Merge the duplicate entries into one".to_string()),
            });
        }

        let Some(protection) = &branch.protection else {
            continue;
        };

        if let Some(reviews) = &protection.required_pull_request_reviews {
            let count = reviews.required_approving_review_count;
            if !(MIN_APPROVING_REVIEW_COUNT..=MAX_APPROVING_REVIEW_COUNT).contains(&count) {
                result.add_error(ValidationError {
                    error_type: ValidationErrorType::InvalidValue,
                    field_path: format!(
                        "{path}.protection.required_pull_request_reviews.required_approving_review_count"
                    ),
                    message: format!(
                        "Approving review count {count} is outside {MIN_APPROVING_REVIEW_COUNT}-{MAX_APPROVING_REVIEW_COUNT}"
                    ),
                    suggestion: None,
                });
            }
        }

        if let Some(checks) = &protection.required_status_checks {
            if checks.contexts.is_empty() {
                result.add_warning(ValidationWarning {
                    field_path: format!("{path}.protection.required_status_checks.contexts"),
                    message: "Status checks are enabled but no contexts are listed".to_string(),
                    recommendation: Some(
                        "List the required checks or remove required_status_checks".to_string(),
                    ),
                });
            }

            if checks.contexts.iter().any(|c| c.trim().is_empty()) {
                result.add_error(ValidationError {
                    error_type: ValidationErrorType::InvalidValue,
                    field_path: format!("{path}.protection.required_status_checks.contexts"),
                    message: "Status check context names cannot be empty".to_string(),
                    suggestion: None,
                });
            }
        }
    }

    result
}
