//! WorkMail organization API surface
//!
//! The subset of the WorkMail API the organization resource needs. The
//! production implementation lives in [`crate::aws`]; tests substitute an
//! in-memory fake.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrganizationInput {
    pub alias: String,
    pub description: Option<String>,
    /// Idempotency token; a retried request with the same token is not
    /// applied twice
    pub client_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOrganizationOutput {
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeOrganizationOutput {
    pub organization_id: Option<String>,
    pub alias: Option<String>,
    pub description: Option<String>,
    pub arn: Option<String>,
    pub state: Option<String>,
    pub default_mail_domain: Option<String>,
    pub directory_id: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOrganizationInput {
    pub organization_id: String,
    pub client_token: String,
    /// Also delete the directory the organization created
    pub delete_directory: bool,
    pub force_delete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub organization_id: Option<String>,
    pub alias: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOrganizationsOutput {
    pub summaries: Vec<OrganizationSummary>,
    pub next_token: Option<String>,
}

/// Remote organization-management API
///
/// Implementations must report a missing organization as
/// [`WorkMailError::OrganizationNotFound`](crate::WorkMailError::OrganizationNotFound).
#[async_trait]
pub trait WorkMailApi: Send + Sync {
    async fn create_organization(
        &self,
        input: CreateOrganizationInput,
    ) -> Result<CreateOrganizationOutput>;

    async fn describe_organization(&self, organization_id: &str)
    -> Result<DescribeOrganizationOutput>;

    async fn delete_organization(&self, input: DeleteOrganizationInput) -> Result<()>;

    /// One page of organizations; pass the previous `next_token` to continue
    async fn list_organizations(&self, next_token: Option<String>)
    -> Result<ListOrganizationsOutput>;
}
