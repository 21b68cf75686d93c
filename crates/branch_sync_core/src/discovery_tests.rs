use super::*;
use crate::test_support::{repository, MockClient};

#[tokio::test]
async fn test_discover_filters_by_topic_and_admin() {
    let client = MockClient::new().with_repositories(vec![
        repository("acme", "widgets", &["managed", "rust"], true),
        repository("acme", "gadgets", &["rust"], true),
        repository("acme", "readonly", &["managed"], false),
        repository("other", "tools", &["managed"], true),
    ]);

    let targets = discover_targets(&client, "managed").await.unwrap();

    assert_eq!(
        targets,
        vec![
            TargetRepository::new("acme", "widgets"),
            TargetRepository::new("other", "tools"),
        ]
    );
}

#[tokio::test]
async fn test_discover_returns_empty_when_nothing_matches() {
    let client =
        MockClient::new().with_repositories(vec![repository("acme", "widgets", &[], true)]);

    let targets = discover_targets(&client, "managed").await.unwrap();

    assert!(targets.is_empty());
}

#[tokio::test]
async fn test_discover_treats_missing_permissions_as_no_access() {
    let mut repo = repository("acme", "widgets", &["managed"], true);
    repo.permissions = None;
    let client = MockClient::new().with_repositories(vec![repo]);

    let targets = discover_targets(&client, "managed").await.unwrap();

    assert!(targets.is_empty());
}

#[tokio::test]
async fn test_discover_wraps_client_failure() {
    let client = MockClient::new().with_failing_repository_listing();

    let result = discover_targets(&client, "managed").await;

    assert!(matches!(result, Err(SyncError::Discovery(_))));
}
