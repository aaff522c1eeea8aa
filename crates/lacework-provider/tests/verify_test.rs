mod common;

use common::MockApi;
use lacework_api::IntegrationType;
use lacework_provider::{
    IntegrationResource, ProviderError, Resource, ResourceState, ResourceStatus,
    resources::alert_channels::{Slack, Webhook},
    verify_and_rollback,
};
use serde_json::json;

fn slack_config() -> serde_json::Value {
    json!({
        "name": "ops-alerts",
        "slack_url": "https://hooks.slack.com/services/T000/B000/XXXX"
    })
}

#[tokio::test]
async fn test_passing_test_keeps_integration() {
    let api = MockApi::new();
    api.insert(common::record("ACME_1", "hook", IntegrationType::Webhook));

    verify_and_rollback(&api, "ACME_1").await.unwrap();

    assert_eq!(MockApi::count(&api.tests), 1);
    assert_eq!(MockApi::count(&api.deletes), 0);
    assert!(api.stored("ACME_1").is_some());
}

#[tokio::test]
async fn test_failing_test_deletes_integration() {
    let api = MockApi::new().fail_tests("channel unreachable");
    api.insert(common::record("ACME_1", "hook", IntegrationType::Webhook));

    let err = verify_and_rollback(&api, "ACME_1").await.unwrap_err();

    match &err {
        ProviderError::VerificationFailed { guid, source } => {
            assert_eq!(guid, "ACME_1");
            assert!(source.to_string().contains("channel unreachable"));
        }
        other => panic!("Expected VerificationFailed, got {:?}", other),
    }
    assert_eq!(MockApi::count(&api.deletes), 1);
    assert!(api.stored("ACME_1").is_none());
}

#[tokio::test]
async fn test_failed_rollback_reports_both_errors() {
    let api = MockApi::new()
        .fail_tests("channel unreachable")
        .fail_deletes("delete refused");
    api.insert(common::record("ACME_1", "hook", IntegrationType::Webhook));

    let err = verify_and_rollback(&api, "ACME_1").await.unwrap_err();

    assert!(matches!(err, ProviderError::RollbackFailed { .. }));
    let message = err.to_string();
    assert!(message.contains("channel unreachable"));
    assert!(message.contains("delete refused"));
    assert!(api.stored("ACME_1").is_some());
}

#[tokio::test]
async fn test_create_with_failing_test_clears_id() {
    let api = MockApi::new().fail_tests("invalid_token");
    let resource = IntegrationResource::<Slack>::new();
    let mut state = ResourceState::new(resource.resource_type());

    let err = resource
        .create(&api, &slack_config(), &mut state)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("invalid_token"));
    assert!(state.is_absent());
    assert_eq!(state.status, ResourceStatus::Deleted);
    assert_eq!(MockApi::count(&api.creates), 1);
    assert_eq!(MockApi::count(&api.deletes), 1);
    assert_eq!(api.len(), 0);
}

#[tokio::test]
async fn test_create_with_failed_rollback_taints_state() {
    let api = MockApi::new()
        .fail_tests("invalid_token")
        .fail_deletes("service unavailable");
    let resource = IntegrationResource::<Slack>::new();
    let mut state = ResourceState::new(resource.resource_type());

    let err = resource
        .create(&api, &slack_config(), &mut state)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RollbackFailed { .. }));
    assert_eq!(state.id, "ACME_0001");
    assert_eq!(state.status, ResourceStatus::Tainted);
}

#[tokio::test]
async fn test_create_without_test_integration() {
    let api = MockApi::new().fail_tests("would fail");
    let resource = IntegrationResource::<Slack>::new();
    let mut state = ResourceState::new(resource.resource_type());

    let mut config = slack_config();
    config["test_integration"] = json!(false);
    resource.create(&api, &config, &mut state).await.unwrap();

    assert_eq!(MockApi::count(&api.tests), 0);
    assert_eq!(state.id, "ACME_0001");
    assert_eq!(state.status, ResourceStatus::Active);
}

#[tokio::test]
async fn test_update_with_failing_test_rolls_back() {
    let api = MockApi::new();
    let resource = IntegrationResource::<Webhook>::new();
    let mut state = ResourceState::new(resource.resource_type());
    let config = json!({"name": "hook", "webhook_url": "https://example.com/hook"});
    resource.create(&api, &config, &mut state).await.unwrap();
    assert_eq!(MockApi::count(&api.tests), 1);

    let api = api.fail_tests("endpoint returned 500");
    let changed = json!({"name": "hook", "webhook_url": "https://example.com/new"});
    let err = resource.update(&api, &changed, &mut state).await.unwrap_err();

    assert!(matches!(err, ProviderError::VerificationFailed { .. }));
    assert!(state.is_absent());
    assert_eq!(MockApi::count(&api.updates), 1);
    assert_eq!(api.len(), 0);
}

#[tokio::test]
async fn test_invalid_config_makes_no_calls() {
    let api = MockApi::new();
    let resource = IntegrationResource::<Slack>::new();
    let mut state = ResourceState::new(resource.resource_type());

    let err = resource
        .create(&api, &json!({"name": "", "slack_url": "not-a-url"}), &mut state)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidConfig { .. }));
    let message = err.to_string();
    assert!(message.contains("'name' must not be empty"));
    assert!(message.contains("slack_url"));
    assert_eq!(MockApi::count(&api.creates), 0);
}
