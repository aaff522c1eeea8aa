//! Resource manifest (`lacework.yaml`)
//!
//! ```yaml
//! resources:
//!   - type: lacework_alert_channel_slack
//!     name: ops
//!     config:
//!       name: ops-alerts
//!       slack_url: https://hooks.slack.com/services/T000/B000/XXXX
//! ```

use anyhow::Context;
use lacework_provider::{DesiredResource, ResourceRegistry};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: Vec<DesiredResource>,
}

impl Manifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid manifest {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(content)?;
        Ok(manifest)
    }

    /// Reject duplicates, unknown types and invalid configurations before
    /// anything talks to Lacework.
    pub fn validate(&self, registry: &ResourceRegistry) -> anyhow::Result<()> {
        let mut seen = BTreeSet::new();
        let mut problems = Vec::new();

        for resource in &self.resources {
            let key = resource.key();
            if !seen.insert(key.clone()) {
                problems.push(format!("{}: declared more than once", key));
                continue;
            }
            let result = registry
                .get(&resource.resource_type)
                .and_then(|r| r.validate(&resource.config));
            if let Err(e) = result {
                problems.push(format!("{}: {}", key, e));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("{}", problems.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
resources:
  - type: lacework_alert_channel_slack
    name: ops
    config:
      name: ops-alerts
      slack_url: https://hooks.slack.com/services/T000/B000/XXXX
  - type: lacework_integration_aws_cfg
    name: prod
    config:
      name: aws-prod
      retries: 3
      credentials:
        role_arn: arn:aws:iam::123456789012:role/lacework
        external_id: abc123
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.resources.len(), 2);
        assert_eq!(manifest.resources[0].key(), "lacework_alert_channel_slack.ops");
        assert_eq!(manifest.resources[1].config["retries"], 3);
        manifest.validate(&ResourceRegistry::builtin()).unwrap();
    }

    #[test]
    fn test_validate_collects_problems() {
        let manifest = Manifest::parse(
            r#"
resources:
  - type: lacework_alert_channel_slack
    name: ops
    config: {name: ops, slack_url: "https://hooks.slack.com/x"}
  - type: lacework_alert_channel_slack
    name: ops
    config: {name: ops, slack_url: "https://hooks.slack.com/x"}
  - type: lacework_alert_channel_carrier_pigeon
    name: coo
  - type: lacework_alert_channel_webhook
    name: hook
    config: {name: hook, webhook_url: "ftp://example.com"}
"#,
        )
        .unwrap();

        let message = manifest
            .validate(&ResourceRegistry::builtin())
            .unwrap_err()
            .to_string();
        assert!(message.contains("declared more than once"));
        assert!(message.contains("unknown resource type"));
        assert!(message.contains("webhook_url"));
    }
}
