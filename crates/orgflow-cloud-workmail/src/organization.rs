//! WorkMail organization resource
//!
//! Create → wait until `Active`, Read → refresh the local model from the
//! remote organization, Delete → wait until `Deleted`, Import → id
//! passthrough. The alias is immutable: a changed alias plans a replace.

use crate::client::{
    CreateOrganizationInput, DeleteOrganizationInput, DescribeOrganizationOutput, WorkMailApi,
};
use orgflow_cloud::{
    ActionType, BackoffConfig, CloudError, Observation, OperationContext, ResourceConfig,
    ResourceState, ResourceStatus, Result, StateChangeConf, Timeouts,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const RESOURCE_TYPE: &str = "workmail_organization";

/// Not-found results tolerated while a new organization becomes visible
const CREATE_NOT_FOUND_CHECKS: u32 = 20;

/// Consecutive `Active` observations required after creation
const CREATE_TARGET_OCCURRENCE: u32 = 2;

/// Organization lifecycle states as reported by WorkMail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationState {
    Requested,
    Creating,
    Active,
    Deleting,
    Deleted,
    Failed,
    /// Anything else, kept verbatim
    Other(String),
}

impl OrganizationState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Requested" => Self::Requested,
            "Creating" => Self::Creating,
            "Active" => Self::Active,
            "Deleting" => Self::Deleting,
            "Deleted" => Self::Deleted,
            "Failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Requested => "Requested",
            Self::Creating => "Creating",
            Self::Active => "Active",
            Self::Deleting => "Deleting",
            Self::Deleted => "Deleted",
            Self::Failed => "Failed",
            Self::Other(raw) => raw,
        }
    }

    pub fn resource_status(&self) -> ResourceStatus {
        match self {
            Self::Requested | Self::Creating => ResourceStatus::Creating,
            Self::Active => ResourceStatus::Active,
            Self::Deleting => ResourceStatus::Deleting,
            Self::Deleted => ResourceStatus::Deleted,
            Self::Failed => ResourceStatus::Failed,
            Self::Other(_) => ResourceStatus::Unknown,
        }
    }
}

impl std::fmt::Display for OrganizationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local record of a managed organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationModel {
    /// Organization id, assigned by WorkMail
    pub id: Option<String>,

    /// Immutable alias chosen at creation
    pub alias: String,

    pub description: Option<String>,

    /// Computed ARN
    pub arn: Option<String>,

    /// Last observed remote state
    pub state: Option<String>,

    #[serde(skip)]
    pub timeouts: Timeouts,
}

impl OrganizationModel {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Desired model from a configuration block
    pub fn from_resource_config(config: &ResourceConfig) -> Result<Self> {
        let alias = config
            .get_config::<String>("alias")
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| {
                CloudError::InvalidConfig(format!("{}: alias is required", config.key()))
            })?;

        Ok(Self {
            id: None,
            alias,
            description: config.get_config::<String>("description"),
            arn: None,
            state: None,
            timeouts: config.timeouts,
        })
    }

    /// Recorded model from the state file
    pub fn from_resource_state(state: &ResourceState) -> Self {
        Self {
            id: Some(state.id.clone()),
            alias: state.get_attribute::<String>("alias").unwrap_or_default(),
            description: state.get_attribute::<String>("description"),
            arn: state.get_attribute::<String>("arn"),
            state: state.get_attribute::<String>("state"),
            timeouts: Timeouts::default(),
        }
    }

    pub fn to_resource_state(&self) -> Result<ResourceState> {
        let id = self.id.as_deref().ok_or_else(|| {
            CloudError::EmptyResult(format!("organization {} has no id", self.alias))
        })?;

        let status = self
            .state
            .as_deref()
            .map(|s| OrganizationState::parse(s).resource_status())
            .unwrap_or(ResourceStatus::Unknown);

        let mut resource = ResourceState::new(id, RESOURCE_TYPE)
            .with_status(status)
            .with_attribute("alias", serde_json::json!(self.alias));
        if let Some(description) = &self.description {
            resource = resource.with_attribute("description", serde_json::json!(description));
        }
        if let Some(arn) = &self.arn {
            resource = resource.with_attribute("arn", serde_json::json!(arn));
        }
        if let Some(state) = &self.state {
            resource = resource.with_attribute("state", serde_json::json!(state));
        }
        Ok(resource)
    }

    /// Overwrite fields with what the remote side reports
    fn refresh_from(&mut self, remote: &DescribeOrganizationOutput) {
        if let Some(id) = &remote.organization_id {
            self.id = Some(id.clone());
        }
        if let Some(alias) = &remote.alias {
            self.alias = alias.clone();
        }
        if remote.description.is_some() {
            self.description = remote.description.clone();
        }
        self.arn = remote.arn.clone().or(self.arn.take());
        self.state = remote.state.clone();
    }

    /// Human readable identity used in error context
    pub fn identity(&self) -> String {
        match &self.id {
            Some(id) => format!("{} {}", RESOURCE_TYPE, id),
            None => format!("{} (alias {})", RESOURCE_TYPE, self.alias),
        }
    }
}

/// Outcome of reading a recorded organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The organization exists; the refreshed model
    Found(OrganizationModel),
    /// The organization no longer exists; drop the local record
    Gone,
}

/// What applying `desired` over `prior` requires
pub fn plan_change(prior: Option<&OrganizationModel>, desired: &OrganizationModel) -> ActionType {
    match prior {
        None => ActionType::Create,
        Some(prior) if prior.alias != desired.alias => ActionType::Replace,
        Some(prior) if prior.description != desired.description => ActionType::Update,
        Some(_) => ActionType::NoOp,
    }
}

/// A fresh idempotency token for create/delete requests
pub fn client_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Lifecycle controller for WorkMail organizations
#[derive(Clone)]
pub struct OrganizationResource {
    client: Arc<dyn WorkMailApi>,
    backoff: BackoffConfig,
    delete_directory: bool,
}

impl OrganizationResource {
    pub fn new(client: Arc<dyn WorkMailApi>) -> Self {
        Self {
            client,
            backoff: BackoffConfig::default(),
            delete_directory: false,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Remove the directory WorkMail created together with the organization
    pub fn with_delete_directory(mut self, delete_directory: bool) -> Self {
        self.delete_directory = delete_directory;
        self
    }

    /// Create the organization and wait until it is `Active`.
    ///
    /// The returned model carries every observed attribute. When the wait
    /// fails nothing is returned, so callers have nothing to commit.
    pub async fn create(
        &self,
        plan: &OrganizationModel,
        ctx: &OperationContext,
    ) -> Result<OrganizationModel> {
        let identity = plan.identity();
        let input = CreateOrganizationInput {
            alias: plan.alias.clone(),
            description: plan.description.clone(),
            client_token: client_token(),
        };

        tracing::info!("Creating WorkMail organization: {}", plan.alias);
        let output = self
            .client
            .create_organization(input)
            .await
            .map_err(|e| CloudError::from(e).with_resource(&identity))?;

        let id = output.organization_id.ok_or_else(|| {
            CloudError::EmptyResult("CreateOrganization returned no organization id".to_string())
                .with_resource(&identity)
        })?;

        let mut model = plan.clone();
        model.id = Some(id.clone());

        let observed = self
            .wait_created(&id, plan.timeouts.create, ctx)
            .await
            .map_err(|e| e.with_resource(&identity))?;
        model.refresh_from(&observed);

        tracing::info!("WorkMail organization {} is active ({})", plan.alias, id);
        Ok(model)
    }

    /// Refresh a recorded organization from the remote side
    pub async fn read(&self, state: &OrganizationModel) -> Result<ReadOutcome> {
        let identity = state.identity();
        let id = state.id.as_deref().ok_or_else(|| {
            CloudError::InvalidConfig("cannot read an organization without id".to_string())
                .with_resource(&identity)
        })?;

        match self.find_by_id(id).await {
            Ok(remote)
                if remote.state.as_deref() == Some(OrganizationState::Deleted.as_str()) =>
            {
                tracing::warn!(
                    "WorkMail organization {} is deleted, removing from state",
                    id
                );
                Ok(ReadOutcome::Gone)
            }
            Ok(remote) => {
                let mut model = state.clone();
                model.refresh_from(&remote);
                Ok(ReadOutcome::Found(model))
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    "WorkMail organization {} not found, removing from state",
                    id
                );
                Ok(ReadOutcome::Gone)
            }
            Err(e) => Err(e.with_resource(&identity)),
        }
    }

    /// Delete the organization and wait until it is gone.
    ///
    /// An organization that does not exist counts as deleted.
    pub async fn delete(&self, state: &OrganizationModel, ctx: &OperationContext) -> Result<()> {
        let identity = state.identity();
        let Some(id) = state.id.as_deref() else {
            return Err(CloudError::InvalidConfig(
                "cannot delete an organization without id".to_string(),
            )
            .with_resource(&identity));
        };

        let input = DeleteOrganizationInput {
            organization_id: id.to_string(),
            client_token: client_token(),
            delete_directory: self.delete_directory,
            force_delete: false,
        };

        tracing::info!("Deleting WorkMail organization: {}", id);
        match self.client.delete_organization(input).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!("WorkMail organization {} already gone", id);
                return Ok(());
            }
            Err(e) => return Err(CloudError::from(e).with_resource(&identity)),
        }

        self.wait_deleted(id, state.timeouts.delete, ctx)
            .await
            .map_err(|e| e.with_resource(&identity))?;

        tracing::info!("WorkMail organization {} deleted", id);
        Ok(())
    }

    /// Re-attach management to an existing organization; a following
    /// [`read`](Self::read) fills in everything else
    pub fn import(&self, id: &str) -> OrganizationModel {
        OrganizationModel {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    /// Describe by id, with missing and empty responses classified
    pub async fn find_by_id(&self, id: &str) -> Result<DescribeOrganizationOutput> {
        let output = self
            .client
            .describe_organization(id)
            .await
            .map_err(CloudError::from)?;

        if output.organization_id.is_none() {
            return Err(CloudError::EmptyResult(format!(
                "DescribeOrganization({}) returned no organization id",
                id
            )));
        }
        Ok(output)
    }

    async fn status(&self, id: &str) -> Result<Observation<DescribeOrganizationOutput>> {
        match self.find_by_id(id).await {
            Ok(output) => {
                let state = output.state.clone().unwrap_or_default();
                Ok(Observation::found(output, state))
            }
            Err(e) if e.is_not_found() => Ok(Observation::NotFound),
            Err(e) => Err(e),
        }
    }

    pub async fn wait_created(
        &self,
        id: &str,
        timeout: Duration,
        ctx: &OperationContext,
    ) -> Result<DescribeOrganizationOutput> {
        let conf = StateChangeConf::new(
            format!("organization {} to become {}", id, OrganizationState::Active),
            [
                OrganizationState::Requested.as_str(),
                OrganizationState::Creating.as_str(),
            ],
            [OrganizationState::Active.as_str()],
            timeout,
        )
        .with_not_found_checks(CREATE_NOT_FOUND_CHECKS)
        .with_continuous_target_occurrence(CREATE_TARGET_OCCURRENCE)
        .with_backoff(self.backoff.clone());

        conf.wait_for_state(ctx.cancel_token(), || self.status(id))
            .await?
            .ok_or_else(|| {
                CloudError::EmptyResult(format!("organization {} vanished while creating", id))
            })
    }

    pub async fn wait_deleted(
        &self,
        id: &str,
        timeout: Duration,
        ctx: &OperationContext,
    ) -> Result<Option<DescribeOrganizationOutput>> {
        let conf = StateChangeConf::new(
            format!("organization {} to become {}", id, OrganizationState::Deleted),
            [
                OrganizationState::Deleting.as_str(),
                OrganizationState::Active.as_str(),
            ],
            [OrganizationState::Deleted.as_str()],
            timeout,
        )
        .with_not_found_as_target()
        .with_backoff(self.backoff.clone());

        conf.wait_for_state(ctx.cancel_token(), || self.status(id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parsing() {
        assert_eq!(OrganizationState::parse("Active"), OrganizationState::Active);
        assert_eq!(
            OrganizationState::parse("Requested").resource_status(),
            ResourceStatus::Creating
        );
        assert_eq!(
            OrganizationState::parse("Impaired"),
            OrganizationState::Other("Impaired".to_string())
        );
        assert_eq!(OrganizationState::parse("Impaired").as_str(), "Impaired");
    }

    #[test]
    fn test_plan_change() {
        let prior = OrganizationModel::new("example-org").with_description("first");

        assert_eq!(plan_change(None, &prior), ActionType::Create);
        assert_eq!(plan_change(Some(&prior), &prior.clone()), ActionType::NoOp);
        assert_eq!(
            plan_change(Some(&prior), &OrganizationModel::new("renamed-org").with_description("first")),
            ActionType::Replace
        );
        assert_eq!(
            plan_change(Some(&prior), &OrganizationModel::new("example-org").with_description("second")),
            ActionType::Update
        );
        // alias wins over description
        assert_eq!(
            plan_change(Some(&prior), &OrganizationModel::new("renamed-org")),
            ActionType::Replace
        );
    }

    #[test]
    fn test_model_from_config_requires_alias() {
        let config = ResourceConfig::new(
            RESOURCE_TYPE,
            "main",
            "workmail",
            serde_json::json!({ "description": "no alias" }),
        );
        let err = OrganizationModel::from_resource_config(&config).unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(_)));

        let config = ResourceConfig::new(
            RESOURCE_TYPE,
            "main",
            "workmail",
            serde_json::json!({ "alias": "example-org", "description": "Example" }),
        );
        let model = OrganizationModel::from_resource_config(&config).unwrap();
        assert_eq!(model.alias, "example-org");
        assert_eq!(model.description.as_deref(), Some("Example"));
        assert_eq!(model.id, None);
    }

    #[test]
    fn test_resource_state_roundtrip() {
        let model = OrganizationModel {
            id: Some("m-0123".to_string()),
            alias: "example-org".to_string(),
            description: Some("Example".to_string()),
            arn: Some("arn:aws:workmail:us-east-1:111122223333:organization/m-0123".to_string()),
            state: Some("Active".to_string()),
            timeouts: Timeouts::default(),
        };

        let state = model.to_resource_state().unwrap();
        assert_eq!(state.id, "m-0123");
        assert_eq!(state.status, ResourceStatus::Active);
        assert_eq!(OrganizationModel::from_resource_state(&state), model);
    }

    #[test]
    fn test_model_without_id_cannot_be_recorded() {
        let err = OrganizationModel::new("example-org")
            .to_resource_state()
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_client_tokens_are_unique() {
        assert_ne!(client_token(), client_token());
    }
}
