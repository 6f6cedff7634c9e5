//! Provider and sweeper registration tables
//!
//! Built once in the composition root and passed down; there is no global
//! registration.

use crate::action::ApplyResult;
use crate::error::{CloudError, Result};
use crate::provider::{CloudProvider, OperationContext};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Providers indexed by name
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn CloudProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Names and resource types must be unique.
    pub fn register(&mut self, provider: Arc<dyn CloudProvider>) -> Result<()> {
        let name = provider.name().to_string();
        if self.providers.contains_key(&name) {
            return Err(CloudError::InvalidConfig(format!(
                "provider '{}' is registered twice",
                name
            )));
        }
        for resource_type in provider.resource_types() {
            if let Ok(existing) = self.for_resource_type(resource_type) {
                return Err(CloudError::InvalidConfig(format!(
                    "resource type '{}' is already handled by provider '{}'",
                    resource_type,
                    existing.name()
                )));
            }
        }

        tracing::debug!("Registered provider: {}", name);
        self.providers.insert(name, provider);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn CloudProvider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::ProviderNotFound(name.to_string()))
    }

    /// Provider responsible for `resource_type`
    pub fn for_resource_type(&self, resource_type: &str) -> Result<Arc<dyn CloudProvider>> {
        self.providers
            .values()
            .find(|p| p.resource_types().iter().any(|t| *t == resource_type))
            .cloned()
            .ok_or_else(|| {
                CloudError::ProviderNotFound(format!("no provider for resource type '{}'", resource_type))
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CloudProvider>> {
        self.providers.values()
    }
}

/// Bulk cleanup of every remote resource of one type
///
/// Used against throwaway test accounts; it ignores local state entirely.
#[async_trait]
pub trait Sweeper: Send + Sync {
    /// Resource type this sweeper removes
    fn resource_type(&self) -> &str;

    /// Remote identifiers that would be swept
    async fn list(&self) -> Result<Vec<String>>;

    /// Delete everything `list` returns
    async fn sweep(&self, ctx: &OperationContext) -> Result<ApplyResult>;
}

/// Sweepers indexed by resource type
#[derive(Default, Clone)]
pub struct SweeperRegistry {
    sweepers: BTreeMap<String, Arc<dyn Sweeper>>,
}

impl SweeperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sweeper: Arc<dyn Sweeper>) -> Result<()> {
        let resource_type = sweeper.resource_type().to_string();
        if self.sweepers.contains_key(&resource_type) {
            return Err(CloudError::InvalidConfig(format!(
                "sweeper for '{}' is registered twice",
                resource_type
            )));
        }
        self.sweepers.insert(resource_type, sweeper);
        Ok(())
    }

    pub fn get(&self, resource_type: &str) -> Option<Arc<dyn Sweeper>> {
        self.sweepers.get(resource_type).cloned()
    }

    pub fn resource_types(&self) -> Vec<&str> {
        self.sweepers.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Sweeper>> {
        self.sweepers.values()
    }

    pub fn is_empty(&self) -> bool {
        self.sweepers.is_empty()
    }
}
