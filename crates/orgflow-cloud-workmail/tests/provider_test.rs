mod common;

use common::{FakeWorkMail, fast_backoff};
use orgflow_cloud::{
    ActionType, CancellationToken, CloudProvider, OperationContext, ProviderState,
    ResourceConfig, ResourceSet, ResourceStatus, Timeouts,
};
use orgflow_cloud_workmail::{RESOURCE_TYPE, WorkMailApi, WorkMailProvider};
use std::sync::Arc;
use std::time::Duration;

fn provider(fake: &Arc<FakeWorkMail>) -> WorkMailProvider {
    let client: Arc<dyn WorkMailApi> = fake.clone();
    WorkMailProvider::new(client)
        .with_region("us-east-1")
        .with_backoff(fast_backoff())
}

fn organization(name: &str, alias: &str, description: Option<&str>) -> ResourceConfig {
    let mut config = serde_json::json!({ "alias": alias });
    if let Some(description) = description {
        config["description"] = serde_json::json!(description);
    }
    ResourceConfig::new(RESOURCE_TYPE, name, "workmail", config)
}

fn desired(resources: Vec<ResourceConfig>) -> ResourceSet {
    let mut set = ResourceSet::new();
    for resource in resources {
        set.add(resource);
    }
    set
}

const MAIN: &str = "workmail_organization:main";

async fn apply_all(
    provider: &WorkMailProvider,
    desired: &ResourceSet,
    state: &mut ProviderState,
) -> orgflow_cloud::ApplyResult {
    let plan = provider.plan(desired, state).await.unwrap();
    provider
        .apply(&plan, desired, state, &OperationContext::new())
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_plan_creates_missing_organization() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);
    let desired = desired(vec![organization("main", "example-org", None)]);

    let plan = provider.plan(&desired, &ProviderState::new()).await.unwrap();

    assert!(plan.has_changes);
    assert_eq!(plan.summary().create, 1);
    assert_eq!(plan.actions[0].resource_key, MAIN);
    assert_eq!(fake.create_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_apply_create_records_state() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);
    let desired = desired(vec![organization("main", "example-org", Some("Example"))]);
    let mut state = ProviderState::new();

    let result = apply_all(&provider, &desired, &mut state).await;
    assert!(result.is_success(), "{:?}", result.failed);

    let recorded = state.get(MAIN).unwrap();
    assert_eq!(recorded.resource_type, RESOURCE_TYPE);
    assert_eq!(recorded.status, ResourceStatus::Active);
    assert_eq!(
        recorded.get_attribute::<String>("alias").as_deref(),
        Some("example-org")
    );
    assert_eq!(
        recorded.get_attribute::<String>("description").as_deref(),
        Some("Example")
    );
    assert!(fake.exists(&recorded.id));

    // applying again changes nothing
    let plan = provider.plan(&desired, &state).await.unwrap();
    assert!(!plan.has_changes);
    assert_eq!(plan.summary().no_change, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_create_commits_nothing() {
    let fake = Arc::new(FakeWorkMail::new().with_creation_states(&["Creating"]));
    let provider = provider(&fake);
    let timeouts = Timeouts {
        create: Duration::from_secs(20),
        ..Default::default()
    };
    let desired = desired(vec![
        organization("main", "example-org", None).with_timeouts(timeouts),
    ]);
    let mut state = ProviderState::new();

    let result = apply_all(&provider, &desired, &mut state).await;

    assert!(!result.is_success());
    assert_eq!(result.failed.len(), 1);
    assert!(result.failed[0].error.as_deref().unwrap().contains("Timeout"));
    assert!(state.get(MAIN).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_alias_change_replaces_organization() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);
    let mut state = ProviderState::new();

    apply_all(
        &provider,
        &desired(vec![organization("main", "old-alias", None)]),
        &mut state,
    )
    .await;
    let old_id = state.get(MAIN).unwrap().id.clone();

    let renamed = desired(vec![organization("main", "new-alias", None)]);
    let plan = provider.plan(&renamed, &state).await.unwrap();
    assert_eq!(plan.summary().replace, 1);
    assert_eq!(
        plan.actions[0].details["alias"]["new"],
        serde_json::json!("new-alias")
    );

    let result = provider
        .apply(&plan, &renamed, &mut state, &OperationContext::new())
        .await
        .unwrap();
    assert!(result.is_success(), "{:?}", result.failed);

    let new_id = state.get(MAIN).unwrap().id.clone();
    assert_ne!(old_id, new_id);
    assert_eq!(fake.delete_order(), vec![old_id]);
    assert_eq!(fake.alias_of(&new_id).as_deref(), Some("new-alias"));
    assert_eq!(fake.create_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_description_change_is_local_update() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);
    let mut state = ProviderState::new();

    apply_all(
        &provider,
        &desired(vec![organization("main", "example-org", Some("before"))]),
        &mut state,
    )
    .await;
    let id = state.get(MAIN).unwrap().id.clone();

    let changed = desired(vec![organization("main", "example-org", Some("after"))]);
    let plan = provider.plan(&changed, &state).await.unwrap();
    assert_eq!(plan.summary().update, 1);

    let result = provider
        .apply(&plan, &changed, &mut state, &OperationContext::new())
        .await
        .unwrap();
    assert!(result.is_success());

    let recorded = state.get(MAIN).unwrap();
    assert_eq!(recorded.id, id);
    assert_eq!(
        recorded.get_attribute::<String>("description").as_deref(),
        Some("after")
    );
    assert_eq!(fake.create_calls(), 1);
    assert_eq!(fake.delete_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_removed_organization_is_deleted() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);
    let mut state = ProviderState::new();

    apply_all(
        &provider,
        &desired(vec![organization("main", "example-org", None)]),
        &mut state,
    )
    .await;

    let empty = ResourceSet::new();
    let plan = provider.plan(&empty, &state).await.unwrap();
    assert_eq!(plan.summary().delete, 1);

    let result = provider
        .apply(&plan, &empty, &mut state, &OperationContext::new())
        .await
        .unwrap();
    assert!(result.is_success());
    assert!(state.get(MAIN).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_plan_rejects_unknown_resource_type() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);
    let desired = desired(vec![ResourceConfig::new(
        "workmail_user",
        "alice",
        "workmail",
        serde_json::json!({}),
    )]);

    let err = provider
        .plan(&desired, &ProviderState::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("workmail_user"));
}

#[tokio::test(start_paused = true)]
async fn test_refresh_drops_vanished_organizations() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);
    let mut state = ProviderState::new();

    apply_all(
        &provider,
        &desired(vec![
            organization("main", "example-org", None),
            organization("spare", "spare-org", None),
        ]),
        &mut state,
    )
    .await;
    let spare_id = state.get("workmail_organization:spare").unwrap().id.clone();
    let created_at = state.get(MAIN).unwrap().created_at;
    fake.vanish(&spare_id);

    let dropped = provider
        .refresh(&mut state, &OperationContext::new())
        .await
        .unwrap();

    assert_eq!(dropped, vec!["workmail_organization:spare".to_string()]);
    assert!(state.get("workmail_organization:spare").is_none());
    let main = state.get(MAIN).unwrap();
    assert_eq!(main.status, ResourceStatus::Active);
    assert_eq!(main.created_at, created_at);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_drops_remotely_deleted_organization() {
    let fake = Arc::new(FakeWorkMail::new().with_deletion_states(&["Deleted"]));
    let provider = provider(&fake);
    let declared = desired(vec![organization("main", "example-org", None)]);
    let mut state = ProviderState::new();

    apply_all(&provider, &declared, &mut state).await;
    let id = state.get(MAIN).unwrap().id.clone();
    fake.retire(&id);

    let dropped = provider
        .refresh(&mut state, &OperationContext::new())
        .await
        .unwrap();
    assert_eq!(dropped, vec![MAIN.to_string()]);
    assert!(state.get(MAIN).is_none());

    // the declared organization is created again
    let plan = provider.plan(&declared, &state).await.unwrap();
    assert_eq!(plan.summary().create, 1);

    let err = provider
        .import(RESOURCE_TYPE, &id, &OperationContext::new())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_stops_when_cancelled() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);
    let mut state = ProviderState::new();

    apply_all(
        &provider,
        &desired(vec![
            organization("main", "example-org", None),
            organization("spare", "spare-org", None),
        ]),
        &mut state,
    )
    .await;
    let describes = fake.describe_calls();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = provider
        .refresh(&mut state, &OperationContext::with_cancel(cancel))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(fake.describe_calls(), describes);
    assert!(state.get(MAIN).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_created_organization_reimports_without_description() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);
    let declared = desired(vec![organization("main", "example-org", Some("Example"))]);
    let mut state = ProviderState::new();

    apply_all(&provider, &declared, &mut state).await;
    let created = state.remove(MAIN).unwrap();

    let imported = provider
        .import(RESOURCE_TYPE, &created.id, &OperationContext::new())
        .await
        .unwrap();

    assert_eq!(imported.id, created.id);
    assert_eq!(
        imported.get_attribute::<String>("alias"),
        created.get_attribute::<String>("alias")
    );
    assert_eq!(
        imported.get_attribute::<String>("arn"),
        created.get_attribute::<String>("arn")
    );
    assert!(imported.get_attribute::<String>("arn").is_some());
    // WorkMail does not store descriptions, so only config can restore it
    assert_eq!(imported.get_attribute::<String>("description"), None);

    state.add(MAIN.to_string(), imported);
    let plan = provider.plan(&declared, &state).await.unwrap();
    assert_eq!(plan.summary().update, 1);
    assert_eq!(plan.actions[0].action_type, ActionType::Update);
}

#[tokio::test(start_paused = true)]
async fn test_import_records_existing_organization() {
    let fake = Arc::new(FakeWorkMail::new());
    fake.insert_existing("m-existing", "existing-org");
    let provider = provider(&fake);

    let imported = provider
        .import(RESOURCE_TYPE, "m-existing", &OperationContext::new())
        .await
        .unwrap();

    assert_eq!(imported.id, "m-existing");
    assert_eq!(imported.status, ResourceStatus::Active);
    assert_eq!(
        imported.get_attribute::<String>("alias").as_deref(),
        Some("existing-org")
    );

    // an imported record plans as unchanged against matching config
    let mut state = ProviderState::new();
    state.add(MAIN.to_string(), imported);
    let plan = provider
        .plan(&desired(vec![organization("main", "existing-org", None)]), &state)
        .await
        .unwrap();
    assert!(!plan.has_changes);
}

#[tokio::test(start_paused = true)]
async fn test_import_of_missing_organization_fails() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);

    let err = provider
        .import(RESOURCE_TYPE, "m-missing", &OperationContext::new())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(start_paused = true)]
async fn test_destroy_removes_from_state() {
    let fake = Arc::new(FakeWorkMail::new());
    let provider = provider(&fake);
    let mut state = ProviderState::new();

    apply_all(
        &provider,
        &desired(vec![organization("main", "example-org", None)]),
        &mut state,
    )
    .await;
    let id = state.get(MAIN).unwrap().id.clone();

    provider
        .destroy(MAIN, &mut state, &OperationContext::new())
        .await
        .unwrap();

    assert!(state.get(MAIN).is_none());
    assert_eq!(fake.delete_order(), vec![id]);

    let err = provider
        .destroy(MAIN, &mut state, &OperationContext::new())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(start_paused = true)]
async fn test_check_auth() {
    let fake = Arc::new(FakeWorkMail::new());
    fake.insert_existing("m-existing", "existing-org");
    let provider = provider(&fake);

    let auth = provider.check_auth().await.unwrap();
    assert!(auth.authenticated);
    assert!(auth.account_info.unwrap().contains("us-east-1"));
}
