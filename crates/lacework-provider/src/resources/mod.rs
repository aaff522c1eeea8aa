//! Built-in integration kinds

pub mod alert_channels;
pub mod cloud_accounts;
pub mod container_registries;

use crate::registry::ResourceRegistry;
use crate::resource::{IntegrationKind, IntegrationResource};

/// Register every built-in kind.
pub fn register_all(registry: &mut ResourceRegistry) {
    use alert_channels::*;
    use cloud_accounts::*;
    use container_registries::*;

    add::<Slack>(registry);
    add::<Webhook>(registry);
    add::<Email>(registry);
    add::<PagerDuty>(registry);
    add::<MicrosoftTeams>(registry);
    add::<Datadog>(registry);
    add::<Splunk>(registry);
    add::<AwsCloudWatch>(registry);
    add::<VictorOps>(registry);
    add::<CiscoWebex>(registry);
    add::<NewRelic>(registry);
    add::<ServiceNow>(registry);

    add::<AwsCfg>(registry);
    add::<AwsCt>(registry);
    add::<AzureCfg>(registry);
    add::<AzureAl>(registry);
    add::<GcpCfg>(registry);
    add::<GcpAt>(registry);

    add::<DockerHub>(registry);
    add::<DockerV2>(registry);
    add::<Ecr>(registry);
    add::<Gcr>(registry);
    add::<Ghcr>(registry);
}

fn add<K: IntegrationKind>(registry: &mut ResourceRegistry) {
    let resource = IntegrationResource::<K>::new().with_retry_config(registry.retry_config().clone());
    registry.register(Box::new(resource));
}

/// Write-only fields come back masked; the locally known value wins.
pub(crate) fn keep_secret(remote: String, prior: Option<&String>) -> String {
    match prior {
        Some(known) if !known.is_empty() => known.clone(),
        _ => remote,
    }
}
