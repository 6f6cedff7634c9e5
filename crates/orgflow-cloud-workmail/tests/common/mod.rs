use async_trait::async_trait;
use orgflow_cloud::BackoffConfig;
use orgflow_cloud_workmail::{
    CreateOrganizationInput, CreateOrganizationOutput, DeleteOrganizationInput,
    DescribeOrganizationOutput, ListOrganizationsOutput, OrganizationSummary, Result, WorkMailApi,
    WorkMailError,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

const PAGE_SIZE: usize = 2;

/// Fast, jitter-free polling for tests running on paused time
#[allow(dead_code)]
pub fn fast_backoff() -> BackoffConfig {
    BackoffConfig {
        min_interval: Duration::from_millis(100),
        max_interval: Duration::from_secs(1),
        multiplier: 2.0,
        jitter: 0.0,
    }
}

struct FakeOrganization {
    alias: String,
    describe_polls: usize,
    hidden_polls: usize,
    deleting: bool,
    delete_polls: usize,
}

#[derive(Default)]
struct Inner {
    organizations: BTreeMap<String, FakeOrganization>,
    next_id: usize,
    creation_states: Vec<String>,
    deletion_states: Vec<String>,
    hidden_polls: usize,
    empty_create_output: bool,
    fail_describe: bool,
    create_tokens: Vec<String>,
    delete_tokens: Vec<String>,
    create_calls: usize,
    describe_calls: usize,
    delete_calls: usize,
    delete_order: Vec<String>,
}

/// In-memory WorkMail with scripted state transitions.
///
/// Each describe call advances an organization through the scripted
/// creation states; the last one sticks. After a delete call it walks the
/// deletion states instead.
pub struct FakeWorkMail {
    inner: Mutex<Inner>,
}

#[allow(dead_code)]
impl FakeWorkMail {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                creation_states: vec!["Creating".into(), "Active".into()],
                deletion_states: vec!["Deleting".into(), "Deleted".into()],
                ..Default::default()
            }),
        }
    }

    pub fn with_creation_states(self, states: &[&str]) -> Self {
        self.inner.lock().unwrap().creation_states = states.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_deletion_states(self, states: &[&str]) -> Self {
        self.inner.lock().unwrap().deletion_states = states.iter().map(|s| s.to_string()).collect();
        self
    }

    /// New organizations answer not-found for this many describe calls
    pub fn with_hidden_polls(self, polls: usize) -> Self {
        self.inner.lock().unwrap().hidden_polls = polls;
        self
    }

    pub fn with_empty_create_output(self) -> Self {
        self.inner.lock().unwrap().empty_create_output = true;
        self
    }

    pub fn with_failing_describe(self) -> Self {
        self.inner.lock().unwrap().fail_describe = true;
        self
    }

    /// An organization created outside of orgflow, already `Active`
    pub fn insert_existing(&self, id: &str, alias: &str) {
        let mut inner = self.inner.lock().unwrap();
        let active = inner.creation_states.len();
        inner.organizations.insert(
            id.to_string(),
            FakeOrganization {
                alias: alias.to_string(),
                describe_polls: active,
                hidden_polls: 0,
                deleting: false,
                delete_polls: 0,
            },
        );
    }

    /// Delete an organization behind orgflow's back; it keeps answering
    /// describe with the deletion states
    pub fn retire(&self, id: &str) {
        if let Some(org) = self.inner.lock().unwrap().organizations.get_mut(id) {
            org.deleting = true;
        }
    }

    /// Remove an organization behind orgflow's back
    pub fn vanish(&self, id: &str) {
        self.inner.lock().unwrap().organizations.remove(id);
    }

    pub fn exists(&self, id: &str) -> bool {
        self.inner.lock().unwrap().organizations.contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner.lock().unwrap().organizations.keys().cloned().collect()
    }

    pub fn alias_of(&self, id: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .organizations
            .get(id)
            .map(|o| o.alias.clone())
    }

    pub fn create_calls(&self) -> usize {
        self.inner.lock().unwrap().create_calls
    }

    pub fn describe_calls(&self) -> usize {
        self.inner.lock().unwrap().describe_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.inner.lock().unwrap().delete_calls
    }

    pub fn create_tokens(&self) -> Vec<String> {
        self.inner.lock().unwrap().create_tokens.clone()
    }

    pub fn delete_tokens(&self) -> Vec<String> {
        self.inner.lock().unwrap().delete_tokens.clone()
    }

    /// Ids in the order delete was called for them
    pub fn delete_order(&self) -> Vec<String> {
        self.inner.lock().unwrap().delete_order.clone()
    }

    /// Create order, as seen through the ids handed out
    pub fn created_ids(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        (1..=inner.next_id).map(fake_id).collect()
    }
}

fn fake_id(n: usize) -> String {
    format!("m-{:032x}", n)
}

fn scripted(states: &[String], poll: usize) -> String {
    states
        .get(poll)
        .or_else(|| states.last())
        .cloned()
        .unwrap_or_default()
}

#[async_trait]
impl WorkMailApi for FakeWorkMail {
    async fn create_organization(
        &self,
        input: CreateOrganizationInput,
    ) -> Result<CreateOrganizationOutput> {
        let mut inner = self.inner.lock().unwrap();
        inner.create_calls += 1;
        inner.create_tokens.push(input.client_token);

        if input.alias.is_empty() {
            return Err(WorkMailError::InvalidParameter("alias must not be empty".into()));
        }

        inner.next_id += 1;
        let id = fake_id(inner.next_id);
        let hidden_polls = inner.hidden_polls;
        inner.organizations.insert(
            id.clone(),
            FakeOrganization {
                alias: input.alias,
                describe_polls: 0,
                hidden_polls,
                deleting: false,
                delete_polls: 0,
            },
        );

        if inner.empty_create_output {
            return Ok(CreateOrganizationOutput::default());
        }
        Ok(CreateOrganizationOutput {
            organization_id: Some(id),
        })
    }

    async fn describe_organization(
        &self,
        organization_id: &str,
    ) -> Result<DescribeOrganizationOutput> {
        let mut inner = self.inner.lock().unwrap();
        inner.describe_calls += 1;

        if inner.fail_describe {
            return Err(WorkMailError::ApiError(
                "DescribeOrganization: ThrottlingException".into(),
            ));
        }

        let creation_states = inner.creation_states.clone();
        let deletion_states = inner.deletion_states.clone();
        let Some(org) = inner.organizations.get_mut(organization_id) else {
            return Err(WorkMailError::OrganizationNotFound(organization_id.to_string()));
        };

        if org.hidden_polls > 0 {
            org.hidden_polls -= 1;
            return Err(WorkMailError::OrganizationNotFound(organization_id.to_string()));
        }

        let state = if org.deleting {
            let state = scripted(&deletion_states, org.delete_polls);
            org.delete_polls += 1;
            state
        } else {
            let state = scripted(&creation_states, org.describe_polls);
            org.describe_polls += 1;
            state
        };

        Ok(DescribeOrganizationOutput {
            organization_id: Some(organization_id.to_string()),
            alias: Some(org.alias.clone()),
            // WorkMail has no description on the remote side
            description: None,
            arn: Some(format!(
                "arn:aws:workmail:us-east-1:111122223333:organization/{}",
                organization_id
            )),
            state: Some(state),
            default_mail_domain: Some(format!("{}.awsapps.com", org.alias)),
            directory_id: Some("d-0123456789".into()),
            error_message: None,
        })
    }

    async fn delete_organization(&self, input: DeleteOrganizationInput) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.delete_calls += 1;
        inner.delete_tokens.push(input.client_token);

        let Some(org) = inner.organizations.get_mut(&input.organization_id) else {
            return Err(WorkMailError::OrganizationNotFound(input.organization_id));
        };
        org.deleting = true;
        inner.delete_order.push(input.organization_id);
        Ok(())
    }

    async fn list_organizations(
        &self,
        next_token: Option<String>,
    ) -> Result<ListOrganizationsOutput> {
        let inner = self.inner.lock().unwrap();
        let offset: usize = next_token
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);

        let all: Vec<OrganizationSummary> = inner
            .organizations
            .iter()
            .map(|(id, org)| OrganizationSummary {
                organization_id: Some(id.clone()),
                alias: Some(org.alias.clone()),
                state: Some(if org.deleting {
                    scripted(&inner.deletion_states, org.delete_polls)
                } else {
                    scripted(&inner.creation_states, org.describe_polls)
                }),
            })
            .collect();

        let summaries: Vec<_> = all.iter().skip(offset).take(PAGE_SIZE).cloned().collect();
        let next = offset + summaries.len();
        Ok(ListOrganizationsOutput {
            summaries,
            next_token: (next < all.len()).then(|| next.to_string()),
        })
    }
}
