pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod refresh;
pub mod remote;
pub mod show;
pub mod types;

use anyhow::Context as _;
use colored::Colorize;
use lacework_api::{ClientConfig, LaceworkClient};
use lacework_config::ConfigOverrides;
use lacework_provider::{ResourceRegistry, RetryConfig, StateManager};
use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by every command
pub struct Context {
    pub state_dir: PathBuf,
    pub overrides: ConfigOverrides,
    pub create_timeout: Duration,
}

impl Context {
    pub fn registry(&self) -> ResourceRegistry {
        ResourceRegistry::with_retry_config(RetryConfig {
            timeout: self.create_timeout,
            ..RetryConfig::default()
        })
    }

    pub fn state_manager(&self) -> StateManager {
        StateManager::new(&self.state_dir)
    }

    /// Resolve credentials and authenticate.
    pub async fn connect(&self) -> anyhow::Result<LaceworkClient> {
        let resolved = lacework_config::resolve(&self.overrides)?;
        tracing::debug!("Resolved credentials: {:?}", resolved);

        let mut config = ClientConfig::new(
            resolved.account.clone(),
            resolved.api_key,
            resolved.api_secret,
        );
        if let Some(subaccount) = resolved.subaccount {
            config = config.with_subaccount(subaccount);
        }

        let client = LaceworkClient::connect(config)
            .await
            .with_context(|| format!("failed to authenticate with account '{}'", resolved.account))?;
        println!(
            "{} {}",
            "Connected to".dimmed(),
            client.api_root().cyan()
        );
        Ok(client)
    }
}
