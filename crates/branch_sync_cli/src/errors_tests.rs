use super::*;

#[test]
fn test_auth_error_display() {
    let error = Error::Auth("Invalid token".to_string());
    assert_eq!(error.to_string(), "Authentication error: Invalid token");
}

#[test]
fn test_config_error_display() {
    let error = Error::Config("Missing field 'sync'".to_string());
    assert_eq!(error.to_string(), "Configuration error: Missing field 'sync'");
}

#[test]
fn test_desired_state_error_display() {
    let error = Error::DesiredState("branches[0].name: Branch name cannot be empty".to_string());
    assert_eq!(
        error.to_string(),
        "Invalid desired state: branches[0].name: Branch name cannot be empty"
    );
}

#[test]
fn test_no_targets_error_display() {
    let error = Error::NoTargets {
        topic: "managed-protection".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "No repositories found with topic 'managed-protection' where you have admin access"
    );
}

#[test]
fn test_invalid_arguments_error_display() {
    let error = Error::InvalidArguments("--repo must be OWNER/NAME".to_string());
    assert_eq!(error.to_string(), "Invalid arguments: --repo must be OWNER/NAME");
}

#[test]
fn test_stdout_flush_failed_error_display() {
    let error = Error::StdOutFlushFailed;
    assert_eq!(error.to_string(), "Failed to flush the std out buffer.");
}

#[test]
fn test_error_debug_format() {
    let error = Error::GitHub("Rate limit exceeded".to_string());
    let debug_output = format!("{:?}", error);
    assert!(debug_output.contains("GitHub"));
    assert!(debug_output.contains("Rate limit exceeded"));
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}
