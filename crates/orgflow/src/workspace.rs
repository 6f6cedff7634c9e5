//! Composition root: configuration, providers and state for one project

use orgflow_cloud::{
    BackoffConfig, CancellationToken, ProviderRegistry, ResourceConfig, ResourceSet,
    StateManager, SweeperRegistry, Timeouts,
};
use orgflow_cloud_workmail::{
    AwsSettings, AwsWorkMailClient, OrganizationResource, OrganizationSweeper, RESOURCE_TYPE,
    WorkMailApi, WorkMailProvider,
};
use orgflow_config::ProjectConfig;
use std::path::PathBuf;
use std::sync::Arc;

pub struct Workspace {
    pub project_root: PathBuf,
    pub config_path: PathBuf,
    pub config: ProjectConfig,
    pub desired: ResourceSet,
    pub providers: ProviderRegistry,
    pub sweepers: SweeperRegistry,
    pub state: StateManager,
}

impl Workspace {
    /// Find the project file and connect the WorkMail provider
    pub async fn load(project_root: PathBuf) -> anyhow::Result<Self> {
        let (config_path, config) = orgflow_config::load_config()?;
        tracing::debug!("Loaded config from {}", config_path.display());

        let settings = AwsSettings {
            region: config.provider.region.clone(),
            profile: config.provider.profile.clone(),
        };
        let client: Arc<dyn WorkMailApi> =
            Arc::new(AwsWorkMailClient::from_settings(&settings).await);

        Self::with_client(project_root, config_path, config, client)
    }

    pub fn with_client(
        project_root: PathBuf,
        config_path: PathBuf,
        config: ProjectConfig,
        client: Arc<dyn WorkMailApi>,
    ) -> anyhow::Result<Self> {
        let desired = resource_set(&config);
        let (providers, sweepers) = build_registries(&config, client)?;

        Ok(Self {
            state: StateManager::new(&project_root),
            project_root,
            config_path,
            config,
            desired,
            providers,
            sweepers,
        })
    }
}

/// Desired resources declared in the project file
pub fn resource_set(config: &ProjectConfig) -> ResourceSet {
    let mut set = ResourceSet::new();
    for org in &config.organizations {
        let mut attributes = serde_json::json!({ "alias": org.alias });
        if let Some(description) = &org.description {
            attributes["description"] = serde_json::json!(description);
        }

        let timeouts = Timeouts {
            create: org.timeouts.create,
            update: org.timeouts.update,
            delete: org.timeouts.delete,
        };
        set.add(
            ResourceConfig::new(RESOURCE_TYPE, &org.name, &config.provider.name, attributes)
                .with_timeouts(timeouts),
        );
    }
    set
}

/// Every provider and sweeper the CLI knows about, registered explicitly
pub fn build_registries(
    config: &ProjectConfig,
    client: Arc<dyn WorkMailApi>,
) -> anyhow::Result<(ProviderRegistry, SweeperRegistry)> {
    let backoff = BackoffConfig {
        min_interval: config.provider.poll.min,
        max_interval: config.provider.poll.max,
        ..Default::default()
    };

    let mut provider = WorkMailProvider::new(Arc::clone(&client))
        .with_backoff(backoff.clone())
        .with_delete_directory(config.provider.delete_directory);
    if let Some(region) = &config.provider.region {
        provider = provider.with_region(region);
    }

    let organizations = OrganizationResource::new(Arc::clone(&client))
        .with_backoff(backoff)
        .with_delete_directory(config.provider.delete_directory);

    let mut providers = ProviderRegistry::new();
    providers.register(Arc::new(provider))?;

    let mut sweepers = SweeperRegistry::new();
    sweepers.register(Arc::new(OrganizationSweeper::new(organizations, client)))?;

    Ok((providers, sweepers))
}

/// A token that is cancelled on Ctrl-C
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight operations");
            child.cancel();
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgflow_config::parse_config_str;
    use std::time::Duration;

    #[test]
    fn test_resource_set_from_config() {
        let config = parse_config_str(
            r#"
            organization "main" {
                alias "example-org"
                description "Example"
                timeouts create="15m"
            }
            organization "spare" {
                alias "spare-org"
            }
        "#,
        )
        .unwrap();

        let set = resource_set(&config);
        let main = set.get(RESOURCE_TYPE, "main").unwrap();
        assert_eq!(main.provider, "workmail");
        assert_eq!(main.get_config::<String>("alias").as_deref(), Some("example-org"));
        assert_eq!(main.get_config::<String>("description").as_deref(), Some("Example"));
        assert_eq!(main.timeouts.create, Duration::from_secs(15 * 60));
        assert_eq!(main.timeouts.delete, Duration::from_secs(10 * 60));

        let spare = set.get(RESOURCE_TYPE, "spare").unwrap();
        assert_eq!(spare.get_config::<String>("description"), None);
    }
}
