//! WorkMail provider implementation

use crate::client::WorkMailApi;
use crate::organization::{
    OrganizationModel, OrganizationResource, RESOURCE_TYPE, ReadOutcome, plan_change,
};
use async_trait::async_trait;
use orgflow_cloud::{
    Action, ActionType, ApplyResult, AuthStatus, BackoffConfig, CloudError, CloudProvider,
    OperationContext, Plan, ProviderState, ResourceSet, ResourceState, Result,
};
use std::sync::Arc;

pub const PROVIDER_NAME: &str = "workmail";

/// Amazon WorkMail provider
pub struct WorkMailProvider {
    client: Arc<dyn WorkMailApi>,
    organizations: OrganizationResource,
    region: Option<String>,
}

impl WorkMailProvider {
    pub fn new(client: Arc<dyn WorkMailApi>) -> Self {
        Self {
            organizations: OrganizationResource::new(Arc::clone(&client)),
            client,
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.organizations = self.organizations.with_backoff(backoff);
        self
    }

    pub fn with_delete_directory(mut self, delete_directory: bool) -> Self {
        self.organizations = self.organizations.with_delete_directory(delete_directory);
        self
    }

    pub fn organizations(&self) -> &OrganizationResource {
        &self.organizations
    }

    fn recorded(state: &ProviderState, key: &str) -> Result<OrganizationModel> {
        state
            .get(key)
            .map(OrganizationModel::from_resource_state)
            .ok_or_else(|| CloudError::NotFound(format!("{} is not in state", key)))
    }

    fn desired(desired: &ResourceSet, key: &str) -> Result<OrganizationModel> {
        let config = desired
            .get_by_key(key)
            .ok_or_else(|| CloudError::InvalidConfig(format!("{} is not configured", key)))?;
        OrganizationModel::from_resource_config(config)
    }

    async fn apply_action(
        &self,
        action: &Action,
        desired: &ResourceSet,
        state: &mut ProviderState,
        ctx: &OperationContext,
    ) -> Result<String> {
        let key = action.resource_key.as_str();
        match action.action_type {
            ActionType::Create => {
                let plan = Self::desired(desired, key)?;
                let created = self.organizations.create(&plan, ctx).await?;
                state.add(key.to_string(), created.to_resource_state()?);
                Ok(format!(
                    "組織 {} を作成しました ({})",
                    created.alias,
                    created.id.as_deref().unwrap_or("-")
                ))
            }
            ActionType::Replace => {
                let plan = Self::desired(desired, key)?;
                let mut prior = Self::recorded(state, key)?;
                prior.timeouts = plan.timeouts;

                self.organizations.delete(&prior, ctx).await?;
                state.remove(key);

                let created = self.organizations.create(&plan, ctx).await?;
                state.add(key.to_string(), created.to_resource_state()?);
                Ok(format!(
                    "組織 {} を {} に置き換えました",
                    prior.alias, created.alias
                ))
            }
            ActionType::Update => {
                // WorkMail has no update call; only locally held fields change
                let plan = Self::desired(desired, key)?;
                let resource = state.resources.get_mut(key).ok_or_else(|| {
                    CloudError::NotFound(format!("{} is not in state", key))
                })?;
                match &plan.description {
                    Some(description) => {
                        resource.set_attribute("description", serde_json::json!(description))
                    }
                    None => {
                        resource.attributes.remove("description");
                    }
                }
                Ok(format!("組織 {} の説明を更新しました", plan.alias))
            }
            ActionType::Delete => {
                let prior = Self::recorded(state, key)?;
                self.organizations.delete(&prior, ctx).await?;
                state.remove(key);
                Ok(format!("組織 {} を削除しました", prior.alias))
            }
            ActionType::NoOp => Ok(String::new()),
        }
    }
}

#[async_trait]
impl CloudProvider for WorkMailProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn display_name(&self) -> &str {
        "Amazon WorkMail"
    }

    fn resource_types(&self) -> &[&'static str] {
        &[RESOURCE_TYPE]
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        match self.client.list_organizations(None).await {
            Ok(page) => {
                let region = self.region.as_deref().unwrap_or("default region");
                Ok(AuthStatus::ok(format!(
                    "{} ({} organizations visible)",
                    region,
                    page.summaries.len()
                )))
            }
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn plan(&self, desired: &ResourceSet, current: &ProviderState) -> Result<Plan> {
        let mut actions = Vec::new();

        for resource in desired.iter() {
            if resource.resource_type != RESOURCE_TYPE {
                return Err(CloudError::InvalidConfig(format!(
                    "未対応のリソースタイプ: {}",
                    resource.resource_type
                )));
            }

            let key = resource.key();
            let wanted = OrganizationModel::from_resource_config(resource)?;
            let prior = current.get(&key).map(OrganizationModel::from_resource_state);

            let action = match plan_change(prior.as_ref(), &wanted) {
                ActionType::Create => Action::new(
                    ActionType::Create,
                    RESOURCE_TYPE,
                    &key,
                    format!("組織 {} を作成", wanted.alias),
                )
                .with_change("alias", serde_json::Value::Null, serde_json::json!(wanted.alias)),
                ActionType::Replace => {
                    let prior = prior.unwrap_or_default();
                    Action::new(
                        ActionType::Replace,
                        RESOURCE_TYPE,
                        &key,
                        format!(
                            "組織 {} を再作成 (alias は変更できません)",
                            prior.alias
                        ),
                    )
                    .with_change(
                        "alias",
                        serde_json::json!(prior.alias),
                        serde_json::json!(wanted.alias),
                    )
                }
                ActionType::Update => {
                    let prior = prior.unwrap_or_default();
                    Action::new(
                        ActionType::Update,
                        RESOURCE_TYPE,
                        &key,
                        format!("組織 {} の説明を更新", wanted.alias),
                    )
                    .with_change(
                        "description",
                        serde_json::json!(prior.description),
                        serde_json::json!(wanted.description),
                    )
                }
                other => Action::new(
                    other,
                    RESOURCE_TYPE,
                    &key,
                    format!("組織 {} は最新です", wanted.alias),
                ),
            };
            actions.push(action);
        }

        for key in current.keys() {
            if desired.get_by_key(&key).is_none() {
                let prior = Self::recorded(current, &key)?;
                actions.push(Action::new(
                    ActionType::Delete,
                    RESOURCE_TYPE,
                    &key,
                    format!("組織 {} を削除", prior.alias),
                ));
            }
        }

        Ok(Plan::new(actions))
    }

    async fn apply(
        &self,
        plan: &Plan,
        desired: &ResourceSet,
        state: &mut ProviderState,
        ctx: &OperationContext,
    ) -> Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            if action.action_type == ActionType::NoOp {
                continue;
            }
            if ctx.is_cancelled() {
                result.add_failure(action.id.clone(), "キャンセルされました".to_string());
                continue;
            }

            tracing::info!("Applying {}: {}", action.action_type, action.resource_key);
            match self.apply_action(action, desired, state, ctx).await {
                Ok(message) => result.add_success(action.id.clone(), message),
                Err(e) => {
                    tracing::error!("{} failed: {}", action.id, e);
                    result.add_failure(action.id.clone(), e.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn refresh(
        &self,
        state: &mut ProviderState,
        ctx: &OperationContext,
    ) -> Result<Vec<String>> {
        let mut dropped = Vec::new();

        for key in state.keys() {
            if ctx.is_cancelled() {
                return Err(CloudError::Cancelled("refresh".to_string()));
            }
            let Some(recorded) = state.get(&key) else {
                continue;
            };
            if recorded.resource_type != RESOURCE_TYPE {
                continue;
            }
            let created_at = recorded.created_at;
            let model = OrganizationModel::from_resource_state(recorded);

            match self.organizations.read(&model).await? {
                ReadOutcome::Found(refreshed) => {
                    let mut resource = refreshed.to_resource_state()?;
                    resource.created_at = created_at;
                    state.add(key, resource);
                }
                ReadOutcome::Gone => {
                    state.remove(&key);
                    dropped.push(key);
                }
            }
        }

        Ok(dropped)
    }

    async fn import(
        &self,
        resource_type: &str,
        remote_id: &str,
        _ctx: &OperationContext,
    ) -> Result<ResourceState> {
        if resource_type != RESOURCE_TYPE {
            return Err(CloudError::InvalidConfig(format!(
                "未対応のリソースタイプ: {}",
                resource_type
            )));
        }

        let model = self.organizations.import(remote_id);
        match self.organizations.read(&model).await? {
            ReadOutcome::Found(imported) => {
                tracing::info!("Imported WorkMail organization {} ({})", imported.alias, remote_id);
                imported.to_resource_state()
            }
            ReadOutcome::Gone => Err(CloudError::NotFound(format!(
                "cannot import {}: organization does not exist",
                remote_id
            ))),
        }
    }

    async fn destroy(
        &self,
        key: &str,
        state: &mut ProviderState,
        ctx: &OperationContext,
    ) -> Result<()> {
        let recorded = Self::recorded(state, key)?;
        self.organizations.delete(&recorded, ctx).await?;
        state.remove(key);
        Ok(())
    }
}
