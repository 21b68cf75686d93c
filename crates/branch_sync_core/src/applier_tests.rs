use super::*;
use crate::test_support::MockClient;
use serde_json::Value;
use tempfile::TempDir;
use tracing_test::traced_test;

fn audit_lines(log: &AuditLog) -> Vec<Value> {
    std::fs::read_to_string(log.path())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn policy() -> ProtectionPolicy {
    ProtectionPolicy {
        enforce_admins: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_apply_policy_success_is_audited_with_payload() {
    let dir = TempDir::new().unwrap();
    let log = AuditLog::from_path(dir.path().join("audit.jsonl")).unwrap();
    let client = MockClient::new();
    let target = TargetRepository::new("acme", "widgets");

    let applied = Applier::new(&client, &log)
        .apply_policy(&target, "main", &policy())
        .await;

    assert!(applied);
    assert_eq!(client.calls(), vec!["update acme/widgets main"]);
    let lines = audit_lines(&log);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["repository"], "acme/widgets");
    assert_eq!(lines[0]["action"], "apply");
    assert_eq!(lines[0]["status"], "success");
    assert_eq!(lines[0]["details"]["branch"], "main");
    assert_eq!(lines[0]["details"]["protection"]["enforce_admins"], true);
}

#[tokio::test]
async fn test_apply_policy_failure_returns_false_and_records_error() {
    let dir = TempDir::new().unwrap();
    let log = AuditLog::from_path(dir.path().join("audit.jsonl")).unwrap();
    let client = MockClient::new().with_failing_mutation("acme/widgets", "main");
    let target = TargetRepository::new("acme", "widgets");

    let applied = Applier::new(&client, &log)
        .apply_policy(&target, "main", &policy())
        .await;

    assert!(!applied);
    let lines = audit_lines(&log);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["status"], "error");
    assert_eq!(lines[0]["details"]["branch"], "main");
    assert_eq!(lines[0]["details"]["protection"]["enforce_admins"], true);
    assert!(lines[0]["error"]
        .as_str()
        .unwrap()
        .contains("Validation Failed"));
}

#[tokio::test]
async fn test_remove_policy_success_and_failure() {
    let dir = TempDir::new().unwrap();
    let log = AuditLog::from_path(dir.path().join("audit.jsonl")).unwrap();
    let client = MockClient::new().with_failing_mutation("acme/widgets", "locked");
    let target = TargetRepository::new("acme", "widgets");
    let applier = Applier::new(&client, &log);

    assert!(applier.remove_policy(&target, "legacy").await);
    assert!(!applier.remove_policy(&target, "locked").await);

    assert_eq!(
        client.calls(),
        vec!["delete acme/widgets legacy", "delete acme/widgets locked"]
    );
    let lines = audit_lines(&log);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["action"], "remove");
    assert_eq!(lines[0]["status"], "success");
    assert_eq!(lines[0]["details"], serde_json::json!({ "branch": "legacy" }));
    assert_eq!(lines[1]["status"], "error");
}

#[tokio::test]
#[traced_test]
async fn test_failure_is_logged_through_tracing() {
    let dir = TempDir::new().unwrap();
    let log = AuditLog::from_path(dir.path().join("audit.jsonl")).unwrap();
    let client = MockClient::new().with_failing_mutation("acme/widgets", "main");
    let target = TargetRepository::new("acme", "widgets");

    Applier::new(&client, &log)
        .apply_policy(&target, "main", &policy())
        .await;

    assert!(logs_contain("Failed to apply branch protection"));
}
