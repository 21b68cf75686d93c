//! JSON Schema validation of the desired-state file.
//!
//! The schema is generated from the policy types with `schemars`, so the Rust model and
//! the schema can never drift apart. Structural problems (wrong types, unknown shapes,
//! review counts outside 1-6) are reported here, before the file is deserialized.
//!
//! # Examples
//!
//! ```rust
//! use config_manager::SchemaValidator;
//! use serde_json::json;
//!
//! let validator = SchemaValidator::new().unwrap();
//! let problems = validator.validate(&json!([{ "name": "main" }]));
//! assert!(problems.is_empty());
//! ```

use schemars::{schema_for, JsonSchema};
use serde_json::Value;
use thiserror::Error;

use crate::policy::BranchRecord;
use crate::validator::{ValidationError, ValidationErrorType};

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// Errors raised while preparing the schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaValidationError {
    /// Error generating JSON schema from Rust types.
    #[error("Schema generation failed: {message}")]
    SchemaGeneration { message: String },

    /// Error compiling the JSON schema for validation.
    #[error("Schema compilation failed: {message}")]
    SchemaCompilation { message: String },
}

/// Generates the JSON schema of `T` as a plain JSON value.
pub fn generate_schema<T: JsonSchema>() -> Result<Value, SchemaValidationError> {
    let schema = schema_for!(T);
    serde_json::to_value(&schema).map_err(|e| SchemaValidationError::SchemaGeneration {
        message: format!("Failed to serialize schema: {}", e),
    })
}

/// Compiled validator for desired-state documents.
pub struct SchemaValidator {
    schema: Value,
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    /// Generates and compiles the schema of a desired-state document (an array of
    /// branch records).
    pub fn new() -> Result<Self, SchemaValidationError> {
        let schema = generate_schema::<Vec<BranchRecord>>()?;
        let validator = jsonschema::validator_for(&schema).map_err(|e| {
            SchemaValidationError::SchemaCompilation {
                message: e.to_string(),
            }
        })?;

        Ok(Self { schema, validator })
    }

    /// The generated schema document.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validates `document` and returns one error per schema violation.
    pub fn validate(&self, document: &Value) -> Vec<ValidationError> {
        self.validator
            .iter_errors(document)
            .map(|e| ValidationError {
                error_type: ValidationErrorType::SchemaViolation,
                field_path: "branches".to_string(),
                message: e.to_string(),
                suggestion: None,
            })
            .collect()
    }

    pub fn is_valid(&self, document: &Value) -> bool {
        self.validator.is_valid(document)
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}
