//! Cloud provider trait definition

use crate::action::{ApplyResult, Plan};
use crate::error::Result;
use crate::state::{ProviderState, ResourceState};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default timeout for every lifecycle phase
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Cloud provider abstraction trait
///
/// A provider owns the lifecycle of its resource types: it turns a desired
/// [`ResourceSet`] into a [`Plan`], applies it against the remote API and
/// keeps the [`ProviderState`] in step with what it observed.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "workmail")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Resource types this provider manages
    fn resource_types(&self) -> &[&'static str];

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Calculate the diff between desired and recorded state
    async fn plan(&self, desired: &ResourceSet, current: &ProviderState) -> Result<Plan>;

    /// Apply the planned actions, recording every observed change in `state`
    async fn apply(
        &self,
        plan: &Plan,
        desired: &ResourceSet,
        state: &mut ProviderState,
        ctx: &OperationContext,
    ) -> Result<ApplyResult>;

    /// Re-read every recorded resource; returns the keys dropped because the
    /// remote resource no longer exists
    async fn refresh(&self, state: &mut ProviderState, ctx: &OperationContext)
    -> Result<Vec<String>>;

    /// Attach an existing remote resource to local management
    async fn import(
        &self,
        resource_type: &str,
        remote_id: &str,
        ctx: &OperationContext,
    ) -> Result<ResourceState>;

    /// Destroy a single recorded resource and forget it
    async fn destroy(
        &self,
        key: &str,
        state: &mut ProviderState,
        ctx: &OperationContext,
    ) -> Result<()>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Per-resource operation timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_TIMEOUT,
            update: DEFAULT_TIMEOUT,
            delete: DEFAULT_TIMEOUT,
        }
    }
}

/// Caller-supplied context for a lifecycle operation
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    cancel: CancellationToken,
}

impl OperationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Token observed by every wait in the operation
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Set of resources to be managed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    /// Resources indexed by `type:name`
    pub resources: BTreeMap<String, ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: ResourceConfig) {
        self.resources.insert(resource.key(), resource);
    }

    pub fn get(&self, resource_type: &str, name: &str) -> Option<&ResourceConfig> {
        let key = format!("{}:{}", resource_type, name);
        self.resources.get(&key)
    }

    pub fn get_by_key(&self, key: &str) -> Option<&ResourceConfig> {
        self.resources.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.values()
    }

    pub fn by_type(&self, resource_type: &str) -> Vec<&ResourceConfig> {
        self.resources
            .values()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    /// Only the resources handled by `provider`
    pub fn for_provider(&self, provider: &str) -> ResourceSet {
        ResourceSet {
            resources: self
                .resources
                .iter()
                .filter(|(_, r)| r.provider == provider)
                .map(|(k, r)| (k.clone(), r.clone()))
                .collect(),
        }
    }
}

/// Configuration for a cloud resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "workmail_organization")
    pub resource_type: String,

    /// Name of the block in the configuration file
    pub name: String,

    /// Provider name
    pub provider: String,

    /// Resource-specific configuration
    pub config: serde_json::Value,

    /// Lifecycle timeouts
    #[serde(default)]
    pub timeouts: Timeouts,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            provider: provider.into(),
            config,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Get the full resource key (type:name)
    pub fn key(&self) -> String {
        format!("{}:{}", self.resource_type, self.name)
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
