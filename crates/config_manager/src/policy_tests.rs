use super::*;
use github_client::{EnabledSetting, PullRequestReviews, Restrictions, StatusChecks, TeamRef, UserRef};
use serde_json::json;

fn full_policy() -> ProtectionPolicy {
    ProtectionPolicy {
        required_status_checks: Some(RequiredStatusChecks {
            strict: true,
            contexts: vec!["ci/build".to_string(), "ci/test".to_string()],
        }),
        required_pull_request_reviews: Some(RequiredPullRequestReviews {
            require_code_owner_reviews: true,
            dismiss_stale_reviews: true,
            required_approving_review_count: 2,
            dismissal_users: BTreeSet::from(["alice".to_string()]),
            dismissal_teams: BTreeSet::new(),
        }),
        enforce_admins: true,
        restrictions: Some(PushRestrictions {
            users: BTreeSet::from(["bob".to_string()]),
            teams: BTreeSet::from(["release".to_string()]),
        }),
    }
}

#[test]
fn test_branch_record_deserializes_minimal_form() {
    let record: BranchRecord = serde_json::from_value(json!({ "name": "main" })).unwrap();

    assert_eq!(record, BranchRecord::unprotected("main"));
}

#[test]
fn test_review_count_defaults_to_one() {
    let reviews: RequiredPullRequestReviews =
        serde_json::from_value(json!({ "dismiss_stale_reviews": true })).unwrap();

    assert_eq!(reviews.required_approving_review_count, 1);
    assert!(reviews.dismiss_stale_reviews);
    assert!(!reviews.require_code_owner_reviews);
}

#[test]
fn test_unprotected_record_omits_protection_when_serialized() {
    let value = serde_json::to_value(BranchRecord::unprotected("dev")).unwrap();

    assert_eq!(value, json!({ "name": "dev" }));
}

#[test]
fn test_user_order_does_not_affect_equality() {
    let a: PushRestrictions =
        serde_json::from_value(json!({ "users": ["carol", "alice"], "teams": [] })).unwrap();
    let b: PushRestrictions =
        serde_json::from_value(json!({ "users": ["alice", "carol"], "teams": [] })).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_context_order_affects_equality() {
    let a = RequiredStatusChecks {
        strict: false,
        contexts: vec!["a".to_string(), "b".to_string()],
    };
    let b = RequiredStatusChecks {
        strict: false,
        contexts: vec!["b".to_string(), "a".to_string()],
    };

    assert_ne!(a, b);
}

#[test]
fn test_to_protection_update_maps_every_section() {
    let update = full_policy().to_protection_update();

    assert!(update.enforce_admins);
    let checks = update.required_status_checks.unwrap();
    assert!(checks.strict);
    assert_eq!(checks.contexts, vec!["ci/build", "ci/test"]);

    let reviews = update.required_pull_request_reviews.unwrap();
    assert_eq!(reviews.required_approving_review_count, 2);
    assert!(reviews.require_code_owner_reviews);
    let dismissal = reviews.dismissal_restrictions.unwrap();
    assert_eq!(dismissal.users, vec!["alice"]);
    assert!(dismissal.teams.is_empty());

    let restrictions = update.restrictions.unwrap();
    assert_eq!(restrictions.users, vec!["bob"]);
    assert_eq!(restrictions.teams, vec!["release"]);
}

#[test]
fn test_to_protection_update_sends_missing_sections_as_null() {
    let update = ProtectionPolicy::default().to_protection_update();
    let body = serde_json::to_value(&update).unwrap();

    assert!(body["required_status_checks"].is_null());
    assert!(body["required_pull_request_reviews"].is_null());
    assert!(body["restrictions"].is_null());
    assert_eq!(body["enforce_admins"], json!(false));
}

#[test]
fn test_to_protection_update_omits_empty_dismissal_restrictions() {
    let policy = ProtectionPolicy {
        required_pull_request_reviews: Some(RequiredPullRequestReviews::default()),
        ..Default::default()
    };

    let update = policy.to_protection_update();

    assert!(update
        .required_pull_request_reviews
        .unwrap()
        .dismissal_restrictions
        .is_none());
}

#[test]
fn test_from_branch_protection_reads_remote_shape() {
    let remote = BranchProtection {
        required_status_checks: Some(StatusChecks {
            strict: true,
            contexts: vec!["ci/build".to_string(), "ci/test".to_string()],
        }),
        required_pull_request_reviews: Some(PullRequestReviews {
            dismiss_stale_reviews: true,
            require_code_owner_reviews: true,
            required_approving_review_count: 2,
            dismissal_restrictions: Some(Restrictions {
                users: vec![UserRef {
                    login: "alice".to_string(),
                }],
                teams: vec![],
            }),
        }),
        enforce_admins: Some(EnabledSetting { enabled: true }),
        restrictions: Some(Restrictions {
            users: vec![UserRef {
                login: "bob".to_string(),
            }],
            teams: vec![TeamRef {
                slug: "release".to_string(),
            }],
        }),
    };

    assert_eq!(ProtectionPolicy::from(&remote), full_policy());
}

#[test]
fn test_from_branch_protection_treats_missing_enforce_admins_as_disabled() {
    let policy = ProtectionPolicy::from(&BranchProtection::default());

    assert_eq!(policy, ProtectionPolicy::default());
}

#[test]
fn test_from_branch_protection_saturates_oversized_review_count() {
    let remote = BranchProtection {
        required_pull_request_reviews: Some(PullRequestReviews {
            required_approving_review_count: 1000,
            ..Default::default()
        }),
        ..Default::default()
    };

    let policy = ProtectionPolicy::from(&remote);

    assert_eq!(
        policy
            .required_pull_request_reviews
            .unwrap()
            .required_approving_review_count,
        u8::MAX
    );
}

#[test]
fn test_snapshot_lookup_and_counts() {
    let snapshot: StateSnapshot = vec![
        BranchRecord::protected("main", full_policy()),
        BranchRecord::unprotected("dev"),
    ]
    .into();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.protected_count(), 1);
    assert!(snapshot.get("dev").is_some());
    assert!(snapshot.get("feature").is_none());
    assert_eq!(
        snapshot.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
        vec!["main", "dev"]
    );
}

#[test]
fn test_snapshot_collects_and_iterates_in_order() {
    let snapshot: StateSnapshot = ["release", "main"]
        .into_iter()
        .map(BranchRecord::unprotected)
        .collect();

    let mut names = Vec::new();
    for record in &snapshot {
        names.push(record.name.clone());
    }

    assert_eq!(names, vec!["release", "main"]);
    assert!(!snapshot.is_empty());
    assert!(StateSnapshot::default().is_empty());
}

#[test]
fn test_snapshot_serializes_as_plain_array() {
    let snapshot = StateSnapshot::new(vec![BranchRecord::unprotected("main")]);

    let value = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(value, json!([{ "name": "main" }]));
    let back: StateSnapshot = serde_json::from_value(value).unwrap();
    assert_eq!(back, snapshot);
}
