//! Integrations API seam

use crate::error::Result;
use crate::types::{Integration, IntegrationType, IntegrationsResponse};
use async_trait::async_trait;

/// Operations the provider needs from the Lacework integrations API.
///
/// `LaceworkClient` is the HTTP implementation; tests substitute an
/// in-memory one. Every call is a single request with no retry.
#[async_trait]
pub trait IntegrationsApi: Send + Sync {
    /// Create an integration. The response carries the server-assigned guid.
    async fn create(&self, integration: &Integration) -> Result<IntegrationsResponse>;

    /// Fetch an integration by guid.
    async fn get(&self, guid: &str) -> Result<IntegrationsResponse>;

    /// Replace an integration; `integration.guid` selects the record.
    async fn update(&self, integration: &Integration) -> Result<IntegrationsResponse>;

    /// Delete an integration by guid.
    async fn delete(&self, guid: &str) -> Result<()>;

    /// Ask Lacework to send a test event through the integration.
    async fn test(&self, guid: &str) -> Result<()>;

    /// List the integrations of one type.
    async fn list(&self, integration_type: IntegrationType) -> Result<IntegrationsResponse>;
}
