//! Resource lifecycle
//!
//! [`Resource`] is what a lifecycle host drives: create, read, update,
//! delete and import one resource instance at a time. The client is handed
//! to every call; state is mutated in place so an operation that fails
//! half-way still leaves an accurate mirror behind.
//!
//! Individual integration kinds implement [`IntegrationKind`] (typed
//! settings, wire payload, field checks) and get the lifecycle from
//! [`IntegrationResource`].

use crate::error::{ProviderError, Result};
use crate::response::single_record;
use crate::retry::{RetryConfig, create_with_retry};
use crate::schema::{ResourceConfig, Validator};
use crate::state::{ResourceState, ResourceStatus};
use crate::verify::verify_and_rollback;
use async_trait::async_trait;
use lacework_api::{Category, Integration, IntegrationType, IntegrationsApi, IntegrationsResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;

/// One declarative resource type
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name, e.g. `lacework_alert_channel_slack`
    fn resource_type(&self) -> &'static str;

    /// Lacework integration type this resource manages
    fn integration_type(&self) -> IntegrationType;

    fn category(&self) -> Category {
        self.integration_type().category()
    }

    /// Check a configuration without touching the API.
    fn validate(&self, config: &serde_json::Value) -> Result<()>;

    /// Create the integration and fill `state`.
    async fn create(
        &self,
        client: &dyn IntegrationsApi,
        config: &serde_json::Value,
        state: &mut ResourceState,
    ) -> Result<()>;

    /// Refresh `state` from Lacework; clears the id if the integration is gone.
    async fn read(&self, client: &dyn IntegrationsApi, state: &mut ResourceState) -> Result<()>;

    /// Push `config` to the integration tracked by `state`.
    async fn update(
        &self,
        client: &dyn IntegrationsApi,
        config: &serde_json::Value,
        state: &mut ResourceState,
    ) -> Result<()>;

    /// Delete the integration tracked by `state` and clear its id.
    async fn delete(&self, client: &dyn IntegrationsApi, state: &mut ResourceState) -> Result<()>;

    /// Adopt an existing integration by guid.
    async fn import(
        &self,
        client: &dyn IntegrationsApi,
        guid: &str,
        state: &mut ResourceState,
    ) -> Result<()>;
}

/// Type-specific half of an integration resource
pub trait IntegrationKind: Send + Sync + 'static {
    const RESOURCE_TYPE: &'static str;
    const INTEGRATION_TYPE: IntegrationType;

    /// Accept `test_integration` and roll back channels that fail their test
    const VERIFY: bool = false;

    /// Accept `retries` and retry create
    const RETRY_CREATE: bool = false;

    /// Configuration fields beyond `name`/`enabled`
    type Settings: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync;

    /// `DATA` payload on the wire
    type Data: Serialize + DeserializeOwned;

    fn validate(_settings: &Self::Settings, _v: &mut Validator) {}

    fn to_data(settings: &Self::Settings) -> Self::Data;

    /// Settings as seen remotely. `prior` holds the local values, used for
    /// write-only fields the API returns masked.
    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings>;
}

/// Lifecycle shared by every integration kind
pub struct IntegrationResource<K> {
    retry: RetryConfig,
    _kind: PhantomData<fn() -> K>,
}

impl<K: IntegrationKind> Default for IntegrationResource<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IntegrationKind> IntegrationResource<K> {
    pub fn new() -> Self {
        Self {
            retry: RetryConfig::default(),
            _kind: PhantomData,
        }
    }

    /// Timeout and interval for retried creates; attempts come from `retries`.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Decode and validate a configuration.
    pub fn parse_config(&self, config: &serde_json::Value) -> Result<ResourceConfig<K::Settings>> {
        let parsed: ResourceConfig<K::Settings> = serde_json::from_value(config.clone())
            .map_err(|e| ProviderError::invalid_config(K::RESOURCE_TYPE, e.to_string()))?;

        let mut v = Validator::new(K::RESOURCE_TYPE);
        v.required("name", &parsed.name);
        if !K::VERIFY {
            v.check(
                parsed.test_integration.is_none(),
                "'test_integration' is only supported by alert channels",
            );
        }
        if K::RETRY_CREATE {
            v.check(parsed.retries != Some(0), "'retries' must be at least 1");
        } else {
            v.check(
                parsed.retries.is_none(),
                "'retries' is not supported by this resource",
            );
        }
        K::validate(&parsed.settings, &mut v);
        v.finish()?;

        Ok(parsed)
    }

    fn build_request(&self, config: &ResourceConfig<K::Settings>) -> Result<Integration> {
        let data = serde_json::to_value(K::to_data(&config.settings))?;
        Ok(Integration::new(config.name.clone(), K::INTEGRATION_TYPE, data).with_enabled(config.enabled))
    }

    fn apply_record(
        &self,
        state: &mut ResourceState,
        record: Integration,
        prior: Option<&K::Settings>,
    ) -> Result<()> {
        if record.integration_type != K::INTEGRATION_TYPE {
            return Err(ProviderError::TypeMismatch {
                guid: record.guid,
                expected: K::INTEGRATION_TYPE.to_string(),
                actual: record.integration_type.to_string(),
            });
        }

        let data: K::Data = serde_json::from_value(record.data.clone())?;
        let settings = K::from_data(data, prior).map_err(|e| match e {
            ProviderError::TypeMismatch {
                guid,
                expected,
                actual,
            } if guid.is_empty() => ProviderError::TypeMismatch {
                guid: record.guid.clone(),
                expected,
                actual,
            },
            other => other,
        })?;
        let attributes = serde_json::to_value(&settings)?;

        state.resource_type = K::RESOURCE_TYPE.to_string();
        state.populate(&record, attributes);
        Ok(())
    }

    /// Store the record a create/update returned. The integration exists
    /// remotely even when its payload does not decode, so it stays tracked.
    fn apply_written(
        &self,
        state: &mut ResourceState,
        record: Integration,
        settings: &K::Settings,
    ) -> Result<()> {
        let identity = record.clone().map_data(|_| ());
        match self.apply_record(state, record, Some(settings)) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(
                    "Integration {} could not be read back, marking it tainted: {}",
                    identity.guid,
                    e
                );
                state.resource_type = K::RESOURCE_TYPE.to_string();
                state.taint(&identity);
                Err(e)
            }
        }
    }

    async fn send_create(
        &self,
        client: &dyn IntegrationsApi,
        request: &Integration,
        config: &ResourceConfig<K::Settings>,
    ) -> Result<IntegrationsResponse> {
        if K::RETRY_CREATE {
            let retry = self.retry.clone().with_max_attempts(config.retries());
            create_with_retry(client, request, &retry).await
        } else {
            Ok(client.create(request).await?)
        }
    }

    /// Test-then-rollback for kinds that verify.
    async fn verify(
        &self,
        client: &dyn IntegrationsApi,
        config: &ResourceConfig<K::Settings>,
        state: &mut ResourceState,
    ) -> Result<()> {
        if !K::VERIFY || !config.test_integration() {
            return Ok(());
        }

        match verify_and_rollback(client, &state.id).await {
            Ok(()) => Ok(()),
            Err(e @ ProviderError::VerificationFailed { .. }) => {
                state.clear_id();
                Err(e)
            }
            Err(e) => {
                state.status = ResourceStatus::Tainted;
                Err(e)
            }
        }
    }

    fn prior_settings(state: &ResourceState) -> Option<K::Settings> {
        serde_json::from_value(state.attributes.clone()).ok()
    }
}

#[async_trait]
impl<K: IntegrationKind> Resource for IntegrationResource<K> {
    fn resource_type(&self) -> &'static str {
        K::RESOURCE_TYPE
    }

    fn integration_type(&self) -> IntegrationType {
        K::INTEGRATION_TYPE
    }

    fn validate(&self, config: &serde_json::Value) -> Result<()> {
        self.parse_config(config).map(|_| ())
    }

    async fn create(
        &self,
        client: &dyn IntegrationsApi,
        config: &serde_json::Value,
        state: &mut ResourceState,
    ) -> Result<()> {
        let config = self.parse_config(config)?;
        let request = self.build_request(&config)?;

        tracing::info!("Creating {} integration '{}'", K::INTEGRATION_TYPE, config.name);
        let response = self.send_create(client, &request, &config).await?;
        let record = single_record(response.data)?;
        self.apply_written(state, record, &config.settings)?;
        tracing::info!("Created {} integration {}", K::INTEGRATION_TYPE, state.id);

        self.verify(client, &config, state).await
    }

    async fn read(&self, client: &dyn IntegrationsApi, state: &mut ResourceState) -> Result<()> {
        if state.is_absent() {
            return Ok(());
        }

        tracing::debug!("Reading {} integration {}", K::INTEGRATION_TYPE, state.id);
        let response = match client.get(&state.id).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                tracing::warn!("Integration {} no longer exists, removing it from state", state.id);
                state.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let Some(record) = response.data.into_iter().find(|r| r.guid == state.id) else {
            tracing::warn!("Integration {} no longer exists, removing it from state", state.id);
            state.clear_id();
            return Ok(());
        };

        let prior = Self::prior_settings(state);
        let tainted = state.status == ResourceStatus::Tainted;
        self.apply_record(state, record, prior.as_ref())?;
        if tainted {
            state.status = ResourceStatus::Tainted;
        }
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn IntegrationsApi,
        config: &serde_json::Value,
        state: &mut ResourceState,
    ) -> Result<()> {
        if state.is_absent() {
            return Err(ProviderError::NotFound(format!(
                "{} has no integration to update",
                K::RESOURCE_TYPE
            )));
        }

        let config = self.parse_config(config)?;
        let request = self.build_request(&config)?.with_guid(state.id.clone());

        tracing::info!("Updating {} integration {}", K::INTEGRATION_TYPE, state.id);
        let response = client.update(&request).await?;
        let record = single_record(response.data)?;
        self.apply_written(state, record, &config.settings)?;

        self.verify(client, &config, state).await
    }

    async fn delete(&self, client: &dyn IntegrationsApi, state: &mut ResourceState) -> Result<()> {
        if state.is_absent() {
            return Ok(());
        }

        tracing::info!("Deleting {} integration {}", K::INTEGRATION_TYPE, state.id);
        match client.delete(&state.id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!("Integration {} was already deleted", state.id);
            }
            Err(e) => return Err(e.into()),
        }
        state.clear_id();
        Ok(())
    }

    async fn import(
        &self,
        client: &dyn IntegrationsApi,
        guid: &str,
        state: &mut ResourceState,
    ) -> Result<()> {
        tracing::info!("Importing {} integration {}", K::INTEGRATION_TYPE, guid);
        let response = client.get(guid).await.map_err(|e| {
            if e.is_not_found() {
                ProviderError::NotFound(guid.to_string())
            } else {
                e.into()
            }
        })?;

        let record = response
            .data
            .into_iter()
            .find(|r| r.guid == guid)
            .ok_or_else(|| ProviderError::NotFound(guid.to_string()))?;

        self.apply_record(state, record, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    struct Hook;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct HookSettings {
        url: String,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    struct HookData {
        webhook_url: String,
    }

    impl IntegrationKind for Hook {
        const RESOURCE_TYPE: &'static str = "test_hook";
        const INTEGRATION_TYPE: IntegrationType = IntegrationType::Webhook;
        type Settings = HookSettings;
        type Data = HookData;

        fn validate(settings: &Self::Settings, v: &mut Validator) {
            v.url("url", &settings.url);
        }

        fn to_data(settings: &Self::Settings) -> Self::Data {
            HookData {
                webhook_url: settings.url.clone(),
            }
        }

        fn from_data(data: Self::Data, _prior: Option<&Self::Settings>) -> Result<Self::Settings> {
            Ok(HookSettings {
                url: data.webhook_url,
            })
        }
    }

    #[test]
    fn test_parse_config_rejects_unsupported_options() {
        let resource = IntegrationResource::<Hook>::new();
        let err = resource
            .validate(&json!({
                "name": "hook",
                "url": "https://example.com",
                "test_integration": false,
                "retries": 2
            }))
            .unwrap_err()
            .to_string();
        assert!(err.contains("test_integration"));
        assert!(err.contains("retries"));
    }

    #[test]
    fn test_parse_config_reports_missing_fields() {
        let resource = IntegrationResource::<Hook>::new();
        let err = resource.validate(&json!({"name": "hook"})).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidConfig { .. }));
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn test_build_request() {
        let resource = IntegrationResource::<Hook>::new();
        let config = resource
            .parse_config(&json!({"name": "hook", "enabled": false, "url": "https://example.com"}))
            .unwrap();
        let request = resource.build_request(&config).unwrap();

        assert_eq!(request.name, "hook");
        assert!(!request.enabled);
        assert_eq!(request.integration_type, IntegrationType::Webhook);
        assert_eq!(request.data, json!({"WEBHOOK_URL": "https://example.com"}));
    }

    #[test]
    fn test_apply_record_rejects_other_types() {
        let resource = IntegrationResource::<Hook>::new();
        let record = Integration::new("x", IntegrationType::SlackChannel, json!({}))
            .with_guid("ACME_1");
        let mut state = ResourceState::new("test_hook");

        let err = resource.apply_record(&mut state, record, None).unwrap_err();
        assert!(matches!(err, ProviderError::TypeMismatch { .. }));
        assert!(state.is_absent());
    }
}
