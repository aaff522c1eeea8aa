//! Resource type lookup

use crate::error::{ProviderError, Result};
use crate::resource::Resource;
use crate::retry::RetryConfig;
use std::collections::BTreeMap;

/// Resource implementations indexed by resource type name
pub struct ResourceRegistry {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    retry: RetryConfig,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            resources: BTreeMap::new(),
            retry: RetryConfig::default(),
        }
    }

    /// Registry with every built-in resource
    pub fn builtin() -> Self {
        Self::with_retry_config(RetryConfig::default())
    }

    /// Built-in resources whose retried creates use `retry`
    pub fn with_retry_config(retry: RetryConfig) -> Self {
        let mut registry = Self {
            resources: BTreeMap::new(),
            retry,
        };
        crate::resources::register_all(&mut registry);
        registry
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Add a resource; a later registration replaces an earlier one.
    pub fn register(&mut self, resource: Box<dyn Resource>) {
        self.resources.insert(resource.resource_type(), resource);
    }

    pub fn get(&self, resource_type: &str) -> Result<&dyn Resource> {
        self.resources
            .get(resource_type)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownResourceType(resource_type.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Resource> {
        self.resources.values().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lacework_api::Category;

    #[test]
    fn test_builtin_registry() {
        let registry = ResourceRegistry::builtin();
        assert_eq!(registry.len(), 23);

        let slack = registry.get("lacework_alert_channel_slack").unwrap();
        assert_eq!(slack.category(), Category::AlertChannel);

        let ecr = registry.get("lacework_integration_ecr").unwrap();
        assert_eq!(ecr.category(), Category::ContainerRegistry);

        let alert_channels = registry
            .iter()
            .filter(|r| r.category() == Category::AlertChannel)
            .count();
        assert_eq!(alert_channels, 12);
    }

    #[test]
    fn test_unknown_type() {
        let registry = ResourceRegistry::builtin();
        assert!(matches!(
            registry.get("lacework_agent_access_token"),
            Err(ProviderError::UnknownResourceType(_))
        ));
    }
}
