//! orgflow Cloud Infrastructure
//!
//! This crate provides the provider-independent half of orgflow: the
//! lifecycle trait every provider implements, the state-change waiter used
//! for asynchronously provisioned resources, plan/action types, the local
//! state file and the explicit provider/sweeper registries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  orgflow CLI                     │
//! │        (plan / apply / refresh / destroy)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │  ProviderRegistry / SweeperRegistry
//! ┌─────────────────▼───────────────────────────────┐
//! │                orgflow-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait CloudProvider { plan, apply, ... } │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │    Waiter    │  │  State Mgmt  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │   workmail    │
//!           │   provider    │
//!           └───────────────┘
//! ```

pub mod action;
pub mod error;
pub mod provider;
pub mod registry;
pub mod state;
pub mod waiter;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use error::{CloudError, Result};
pub use provider::{
    AuthStatus, CloudProvider, DEFAULT_TIMEOUT, OperationContext, ResourceConfig, ResourceSet,
    Timeouts,
};
pub use registry::{ProviderRegistry, Sweeper, SweeperRegistry};
pub use state::{
    GlobalState, ProviderState, ResourceState, ResourceStatus, StateLock, StateManager,
};
pub use waiter::{BackoffConfig, Observation, StateChangeConf};

// Re-export for providers and callers that build an OperationContext
pub use tokio_util::sync::CancellationToken;
