//! WorkMail provider error types

use orgflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkMailError {
    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Organization is not in a valid state for this operation: {0}")]
    OrganizationState(String),

    #[error("WorkMail API error: {0}")]
    ApiError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] CloudError),
}

impl WorkMailError {
    pub fn is_not_found(&self) -> bool {
        match self {
            WorkMailError::OrganizationNotFound(_) => true,
            WorkMailError::CloudError(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl From<WorkMailError> for CloudError {
    fn from(err: WorkMailError) -> Self {
        match err {
            WorkMailError::OrganizationNotFound(id) => CloudError::NotFound(id),
            WorkMailError::InvalidConfig(msg) => CloudError::InvalidConfig(msg),
            WorkMailError::CloudError(e) => e,
            other => CloudError::Fatal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkMailError>;
