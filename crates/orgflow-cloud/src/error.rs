//! Cloud provider error types

use thiserror::Error;

/// Cloud provider errors
///
/// `NotFound` is the only recoverable kind: lifecycle operations turn it into
/// a benign outcome (drop the record, treat as already deleted). Everything
/// else is surfaced to the caller, enriched with the resource identity via
/// [`CloudError::with_resource`].
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Timeout waiting for {what} (last state: {last_state})")]
    Timeout { what: String, last_state: String },

    #[error("Cancelled while waiting for {0}")]
    Cancelled(String),

    #[error("Remote API error: {0}")]
    Fatal(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Unexpected state '{state}', wanted one of: {expected}")]
    UnexpectedState { state: String, expected: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("{resource}: {source}")]
    Resource {
        resource: String,
        #[source]
        source: Box<CloudError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Attach the identity of the resource the error happened on.
    ///
    /// An error that already carries an identity is returned untouched.
    pub fn with_resource(self, resource: impl Into<String>) -> Self {
        match self {
            CloudError::Resource { .. } => self,
            other => CloudError::Resource {
                resource: resource.into(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, looking through any resource context.
    pub fn root(&self) -> &CloudError {
        match self {
            CloudError::Resource { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), CloudError::NotFound(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), CloudError::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), CloudError::Cancelled(_))
    }

    /// Errors that abort an operation immediately
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.root(),
            CloudError::Fatal(_) | CloudError::EmptyResult(_) | CloudError::UnexpectedState { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
