//! Typed resource configuration and field validation

use crate::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};

/// Create attempts for kinds that retry, unless `retries` says otherwise
pub const DEFAULT_RETRIES: u32 = 5;

/// Configuration of one resource instance
///
/// The fields every integration shares sit at the top level; the
/// type-specific ones are flattened in from `S`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig<S> {
    /// Integration name shown in the Lacework console
    pub name: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Send a test event after create/update and roll back on failure.
    /// Alert channels only; defaults to `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_integration: Option<bool>,

    /// Create attempts before giving up. Retrying kinds only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    #[serde(flatten)]
    pub settings: S,
}

impl<S> ResourceConfig<S> {
    pub fn test_integration(&self) -> bool {
        self.test_integration.unwrap_or(true)
    }

    pub fn retries(&self) -> u32 {
        self.retries.unwrap_or(DEFAULT_RETRIES)
    }
}

fn default_enabled() -> bool {
    true
}

/// Collects field problems so they are reported together
pub struct Validator {
    resource_type: String,
    problems: Vec<String>,
}

impl Validator {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            problems: Vec::new(),
        }
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.problems.push(message.into());
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(
            !value.trim().is_empty(),
            format!("'{}' must not be empty", field),
        )
    }

    /// `http://` or `https://` followed by a host
    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        let host = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"))
            .map(|rest| rest.split(['/', '?', '#']).next().unwrap_or_default());
        self.check(
            host.is_some_and(|h| !h.is_empty()),
            format!("'{}' must be an http(s) URL, got '{}'", field, value),
        )
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        self.check(
            allowed.contains(&value),
            format!(
                "'{}' must be one of [{}], got '{}'",
                field,
                allowed.join(", "),
                value
            ),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn finish(self) -> Result<()> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::invalid_config(
                self.resource_type,
                self.problems.join("; "),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Hook {
        url: String,
    }

    #[test]
    fn test_defaults() {
        let config: ResourceConfig<Hook> =
            serde_json::from_value(json!({"name": "ops", "url": "https://example.com"})).unwrap();
        assert!(config.enabled);
        assert!(config.test_integration());
        assert_eq!(config.retries(), DEFAULT_RETRIES);
        assert_eq!(config.settings.url, "https://example.com");
    }

    #[test]
    fn test_serialize_omits_unset_options() {
        let config = ResourceConfig {
            name: "ops".to_string(),
            enabled: false,
            test_integration: None,
            retries: None,
            settings: Hook {
                url: "https://example.com".to_string(),
            },
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({"name": "ops", "enabled": false, "url": "https://example.com"})
        );
    }

    #[test]
    fn test_url_validation() {
        let mut v = Validator::new("lacework_alert_channel_webhook");
        v.url("webhook_url", "https://example.com/hook");
        v.url("webhook_url", "http://10.0.0.1:8080");
        assert!(v.is_empty());

        v.url("webhook_url", "ftp://example.com");
        v.url("webhook_url", "https://");
        let err = v.finish().unwrap_err().to_string();
        assert!(err.contains("ftp://example.com"));
        assert!(err.contains("'https://'"));
    }

    #[test]
    fn test_one_of_and_required() {
        let mut v = Validator::new("t");
        v.one_of("site", "eu", &["com", "eu"]).required("key", "abc");
        assert!(v.is_empty());

        v.one_of("site", "us", &["com", "eu"]).required("key", "  ");
        let err = v.finish().unwrap_err().to_string();
        assert!(err.contains("must be one of [com, eu], got 'us'"));
        assert!(err.contains("'key' must not be empty"));
    }
}
