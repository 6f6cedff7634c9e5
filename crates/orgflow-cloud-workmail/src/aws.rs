//! WorkMail API client backed by the AWS SDK

use crate::client::{
    CreateOrganizationInput, CreateOrganizationOutput, DeleteOrganizationInput,
    DescribeOrganizationOutput, ListOrganizationsOutput, OrganizationSummary, WorkMailApi,
};
use crate::error::{Result, WorkMailError};
use async_trait::async_trait;
use aws_sdk_workmail::Client;
use aws_sdk_workmail::config::Region;
use aws_sdk_workmail::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// Connection settings for the AWS client
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    /// Falls back to the standard AWS region chain when unset
    pub region: Option<String>,
    /// Named profile from the shared AWS config files
    pub profile: Option<String>,
}

pub struct AwsWorkMailClient {
    client: Client,
}

impl AwsWorkMailClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS credential and region chain
    pub async fn from_settings(settings: &AwsSettings) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        tracing::debug!(
            "WorkMail client configured for region {}",
            config
                .region()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "(default)".to_string())
        );
        Self::new(Client::new(&config))
    }
}

/// Translate an SDK error into the provider taxonomy
fn map_sdk_error<E, R>(operation: &str, organization_id: Option<&str>, err: SdkError<E, R>) -> WorkMailError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = err.message().unwrap_or_default().to_string();
    match err.code() {
        Some("OrganizationNotFoundException")
        | Some("ResourceNotFoundException")
        | Some("EntityNotFoundException") => WorkMailError::OrganizationNotFound(
            organization_id.map(str::to_string).unwrap_or(message),
        ),
        Some("InvalidParameterException") => {
            WorkMailError::InvalidParameter(format!("{}: {}", operation, message))
        }
        Some("OrganizationStateException") => {
            WorkMailError::OrganizationState(format!("{}: {}", operation, message))
        }
        _ => WorkMailError::ApiError(format!("{}: {}", operation, DisplayErrorContext(&err))),
    }
}

#[async_trait]
impl WorkMailApi for AwsWorkMailClient {
    async fn create_organization(
        &self,
        input: CreateOrganizationInput,
    ) -> Result<CreateOrganizationOutput> {
        // WorkMail has no description field; it only lives in local state
        let output = self
            .client
            .create_organization()
            .alias(&input.alias)
            .client_token(&input.client_token)
            .send()
            .await
            .map_err(|e| map_sdk_error("CreateOrganization", None, e))?;

        Ok(CreateOrganizationOutput {
            organization_id: output.organization_id().map(str::to_string),
        })
    }

    async fn describe_organization(
        &self,
        organization_id: &str,
    ) -> Result<DescribeOrganizationOutput> {
        let output = self
            .client
            .describe_organization()
            .organization_id(organization_id)
            .send()
            .await
            .map_err(|e| map_sdk_error("DescribeOrganization", Some(organization_id), e))?;

        Ok(DescribeOrganizationOutput {
            organization_id: output.organization_id().map(str::to_string),
            alias: output.alias().map(str::to_string),
            description: None,
            arn: output.arn().map(str::to_string),
            state: output.state().map(str::to_string),
            default_mail_domain: output.default_mail_domain().map(str::to_string),
            directory_id: output.directory_id().map(str::to_string),
            error_message: output.error_message().map(str::to_string),
        })
    }

    async fn delete_organization(&self, input: DeleteOrganizationInput) -> Result<()> {
        self.client
            .delete_organization()
            .organization_id(&input.organization_id)
            .client_token(&input.client_token)
            .delete_directory(input.delete_directory)
            .force_delete(input.force_delete)
            .send()
            .await
            .map_err(|e| {
                map_sdk_error("DeleteOrganization", Some(input.organization_id.as_str()), e)
            })?;
        Ok(())
    }

    async fn list_organizations(
        &self,
        next_token: Option<String>,
    ) -> Result<ListOrganizationsOutput> {
        let output = self
            .client
            .list_organizations()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| map_sdk_error("ListOrganizations", None, e))?;

        let summaries = output
            .organization_summaries()
            .iter()
            .map(|s| OrganizationSummary {
                organization_id: s.organization_id().map(str::to_string),
                alias: s.alias().map(str::to_string),
                state: s.state().map(str::to_string),
            })
            .collect();

        Ok(ListOrganizationsOutput {
            summaries,
            next_token: output.next_token().map(str::to_string),
        })
    }
}
