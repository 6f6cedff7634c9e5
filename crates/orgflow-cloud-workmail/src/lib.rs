//! Amazon WorkMail provider for orgflow
//!
//! This crate implements the CloudProvider trait for Amazon WorkMail,
//! enabling orgflow to manage WorkMail organizations.
//!
//! # Features
//!
//! - Organization lifecycle (create, read, delete, import)
//! - Waiting on asynchronous provisioning with backoff and timeouts
//! - Sweeping leftover organizations from test accounts
//!
//! # Requirements
//!
//! - AWS credentials resolvable through the standard chain
//!   (environment, shared config/credentials files, SSO, instance roles)
//!
//! # Example
//!
//! ```ignore
//! use orgflow_cloud::{CloudProvider, OperationContext};
//! use orgflow_cloud_workmail::{AwsSettings, AwsWorkMailClient, WorkMailProvider};
//! use std::sync::Arc;
//!
//! let settings = AwsSettings { region: Some("us-east-1".into()), profile: None };
//! let client = Arc::new(AwsWorkMailClient::from_settings(&settings).await);
//! let provider = WorkMailProvider::new(client).with_region("us-east-1");
//!
//! let auth = provider.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//!
//! let state = provider.import("workmail_organization", "m-0123", &OperationContext::new()).await?;
//! ```

pub mod aws;
pub mod client;
pub mod error;
pub mod organization;
pub mod provider;
pub mod sweep;

pub use aws::{AwsSettings, AwsWorkMailClient};
pub use client::{
    CreateOrganizationInput, CreateOrganizationOutput, DeleteOrganizationInput,
    DescribeOrganizationOutput, ListOrganizationsOutput, OrganizationSummary, WorkMailApi,
};
pub use error::{Result, WorkMailError};
pub use organization::{
    OrganizationModel, OrganizationResource, OrganizationState, RESOURCE_TYPE, ReadOutcome,
    plan_change,
};
pub use provider::{PROVIDER_NAME, WorkMailProvider};
pub use sweep::OrganizationSweeper;
