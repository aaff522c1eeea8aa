//! Lacework integration resources
//!
//! Declarative lifecycle management for Lacework alert channels, cloud
//! account integrations and container registry integrations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   lwprov CLI                     │
//! │            (plan / apply / destroy)              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               lacework-provider                  │
//! │  ┌──────────────┐  ┌──────────────┐             │
//! │  │  Plan/Apply  │  │  State Mgmt  │             │
//! │  └──────┬───────┘  └──────────────┘             │
//! │  ┌──────▼───────────────────────────────────┐   │
//! │  │  trait Resource  (23 integration kinds)  │   │
//! │  │  verify + rollback · retry · validation  │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │ &dyn IntegrationsApi
//! ┌─────────────────▼───────────────────────────────┐
//! │                 lacework-api                     │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod apply;
pub mod error;
pub mod plan;
pub mod registry;
pub mod resource;
pub mod resources;
pub mod response;
pub mod retry;
pub mod schema;
pub mod state;
pub mod verify;

// Re-exports
pub use apply::Applier;
pub use error::{ProviderError, Result, SUPPORT_URL};
pub use plan::{
    Action, ActionResult, ActionType, ApplyResult, DesiredResource, Plan, PlanSummary,
    plan_apply, plan_destroy,
};
pub use registry::ResourceRegistry;
pub use resource::{IntegrationKind, IntegrationResource, Resource};
pub use response::single_record;
pub use retry::{AttemptBudget, RetryConfig, RetryError, create_with_retry, retry_until};
pub use schema::{DEFAULT_RETRIES, ResourceConfig, Validator};
pub use state::{GlobalState, ResourceState, ResourceStatus, StateLock, StateManager, state_key};
pub use verify::verify_and_rollback;
