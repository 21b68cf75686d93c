//! Desired-state configuration for branch protection.
//!
//! This crate owns the typed representation of a branch protection policy and everything
//! needed to get one from disk into memory:
//!
//! - [`policy`]: the policy model ([`BranchRecord`], [`ProtectionPolicy`], [`StateSnapshot`])
//!   and its conversion to and from the GitHub wire types
//! - [`schema`]: JSON schema generation and structural validation of the settings file
//! - [`validator`]: business rules the schema cannot express (unique names, review counts)
//! - [`settings_file`]: loading and saving the desired-state file
//!
//! A settings file is validated once, when it is loaded. Code further down the pipeline
//! works with the typed model and never re-validates it.

pub mod errors;
pub mod policy;
pub mod schema;
pub mod settings_file;
pub mod validator;

pub use errors::{ConfigurationError, ConfigurationResult};
pub use policy::{
    BranchRecord, ProtectionPolicy, PushRestrictions, RequiredPullRequestReviews,
    RequiredStatusChecks, StateSnapshot, MAX_APPROVING_REVIEW_COUNT, MIN_APPROVING_REVIEW_COUNT,
};
pub use schema::{SchemaValidationError, SchemaValidator};
pub use settings_file::{
    load_desired_state, parse_desired_state, save_desired_state, validate_desired_state,
    DEFAULT_SETTINGS_FILE,
};
pub use validator::{
    validate_snapshot, ValidationError, ValidationErrorType, ValidationResult, ValidationWarning,
};
