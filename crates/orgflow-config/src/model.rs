//! Parsed project configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_POLL_MIN: Duration = Duration::from_secs(1);
pub const DEFAULT_POLL_MAX: Duration = Duration::from_secs(10);
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Whole project file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub provider: ProviderSettings,
    pub organizations: Vec<OrganizationBlock>,
}

impl ProjectConfig {
    pub fn organization(&self, name: &str) -> Option<&OrganizationBlock> {
        self.organizations.iter().find(|o| o.name == name)
    }
}

/// `provider "workmail" { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub name: String,

    /// Falls back to the AWS environment chain when unset
    pub region: Option<String>,

    pub profile: Option<String>,

    /// Remove the WorkMail directory together with the organization
    pub delete_directory: bool,

    pub poll: PollSettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: "workmail".to_string(),
            region: None,
            profile: None,
            delete_directory: false,
            poll: PollSettings::default(),
        }
    }
}

/// `poll min="1s" max="10s"`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollSettings {
    pub min: Duration,
    pub max: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            min: DEFAULT_POLL_MIN,
            max: DEFAULT_POLL_MAX,
        }
    }
}

/// `organization "<name>" { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationBlock {
    /// Local resource name, unique within the project
    pub name: String,
    pub alias: String,
    pub description: Option<String>,
    pub timeouts: TimeoutSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            create: DEFAULT_OPERATION_TIMEOUT,
            update: DEFAULT_OPERATION_TIMEOUT,
            delete: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}
