//! Sweeper for leftover WorkMail organizations in test accounts

use crate::client::WorkMailApi;
use crate::organization::{OrganizationModel, OrganizationResource, OrganizationState, RESOURCE_TYPE};
use async_trait::async_trait;
use orgflow_cloud::{ApplyResult, CloudError, OperationContext, Result, Sweeper, Timeouts};
use std::sync::Arc;

pub struct OrganizationSweeper {
    client: Arc<dyn WorkMailApi>,
    organizations: OrganizationResource,
    timeouts: Timeouts,
}

impl OrganizationSweeper {
    pub fn new(organizations: OrganizationResource, client: Arc<dyn WorkMailApi>) -> Self {
        Self {
            client,
            organizations,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Every organization that is not already deleted, following pagination
    async fn live_organizations(&self) -> Result<Vec<OrganizationModel>> {
        let mut found = Vec::new();
        let mut next_token = None;

        loop {
            let page = self
                .client
                .list_organizations(next_token)
                .await
                .map_err(CloudError::from)?;

            for summary in page.summaries {
                let Some(id) = summary.organization_id else {
                    continue;
                };
                let state = summary.state.as_deref().map(OrganizationState::parse);
                if state == Some(OrganizationState::Deleted) {
                    continue;
                }
                found.push(OrganizationModel {
                    id: Some(id),
                    alias: summary.alias.unwrap_or_default(),
                    state: summary.state,
                    timeouts: self.timeouts,
                    ..Default::default()
                });
            }

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(found)
    }
}

#[async_trait]
impl Sweeper for OrganizationSweeper {
    fn resource_type(&self) -> &str {
        RESOURCE_TYPE
    }

    async fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .live_organizations()
            .await?
            .into_iter()
            .filter_map(|org| org.id)
            .collect())
    }

    async fn sweep(&self, ctx: &OperationContext) -> Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for org in self.live_organizations().await? {
            let id = org.id.clone().unwrap_or_default();
            let action_id = format!("sweep-{}", id);
            if ctx.is_cancelled() {
                result.add_failure(action_id, "キャンセルされました".to_string());
                continue;
            }

            tracing::info!("Sweeping WorkMail organization {} ({})", org.alias, id);
            match self.organizations.delete(&org, ctx).await {
                Ok(()) => result.add_success(action_id, format!("組織 {} を削除しました", id)),
                Err(e) => {
                    tracing::warn!("Failed to sweep {}: {}", id, e);
                    result.add_failure(action_id, e.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }
}
