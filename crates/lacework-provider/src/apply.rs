//! Plan execution against the Lacework API

use crate::error::{ProviderError, Result};
use crate::plan::{Action, ActionType, ApplyResult, Plan};
use crate::registry::ResourceRegistry;
use crate::state::{GlobalState, ResourceState, state_key};
use lacework_api::IntegrationsApi;
use std::time::Instant;

/// Runs plans one action at a time, keeping state current after each.
pub struct Applier<'a> {
    registry: &'a ResourceRegistry,
    client: &'a dyn IntegrationsApi,
}

impl<'a> Applier<'a> {
    pub fn new(registry: &'a ResourceRegistry, client: &'a dyn IntegrationsApi) -> Self {
        Self { registry, client }
    }

    /// Re-read every tracked integration. Entries that no longer exist
    /// remotely are dropped; returns their keys.
    pub async fn refresh(&self, state: &mut GlobalState) -> Result<Vec<String>> {
        let mut removed = Vec::new();
        let keys: Vec<String> = state.resources.keys().cloned().collect();

        for key in keys {
            let Some(mut current) = state.get_resource(&key).cloned() else {
                continue;
            };
            let resource = self.registry.get(&current.resource_type)?;
            resource.read(self.client, &mut current).await?;

            if current.is_absent() {
                state.remove_resource(&key);
                removed.push(key);
            } else {
                state.set_resource(key, current);
            }
        }

        Ok(removed)
    }

    /// Adopt integration `guid` as `resource_type.name`.
    pub async fn import(
        &self,
        resource_type: &str,
        name: &str,
        guid: &str,
        state: &mut GlobalState,
    ) -> Result<()> {
        let key = state_key(resource_type, name);
        if let Some(existing) = state.get_resource(&key)
            && !existing.is_absent()
        {
            return Err(ProviderError::StateError(format!(
                "{} already tracks integration {}",
                key, existing.id
            )));
        }
        if let Some((other, _)) = state.find_by_id(guid) {
            return Err(ProviderError::StateError(format!(
                "integration {} is already tracked as {}",
                guid, other
            )));
        }

        let resource = self.registry.get(resource_type)?;
        let mut imported = ResourceState::new(resource_type);
        resource.import(self.client, guid, &mut imported).await?;
        state.set_resource(key, imported);
        Ok(())
    }

    /// Apply `plan`. Failures are recorded per action and do not stop the run.
    pub async fn apply(&self, plan: &Plan, state: &mut GlobalState) -> ApplyResult {
        let started = Instant::now();
        let mut result = ApplyResult::new();

        for action in &plan.actions {
            if action.action_type == ActionType::NoOp {
                continue;
            }

            tracing::info!("{}", action.description);
            match self.apply_action(action, state).await {
                Ok(message) => result.add_success(action.id.clone(), message),
                Err(e) => {
                    tracing::error!("{} failed: {}", action.id, e);
                    result.add_failure(action.id.clone(), e.to_string());
                }
            }
        }

        result.duration_ms = started.elapsed().as_millis() as u64;
        result
    }

    async fn apply_action(&self, action: &Action, state: &mut GlobalState) -> Result<String> {
        let resource = self.registry.get(&action.resource_type)?;
        let mut current = state
            .get_resource(&action.id)
            .cloned()
            .unwrap_or_else(|| ResourceState::new(&action.resource_type));

        match action.action_type {
            ActionType::NoOp => Ok(String::new()),
            ActionType::Delete => {
                let guid = current.id.clone();
                resource.delete(self.client, &mut current).await?;
                state.remove_resource(&action.id);
                Ok(format!("deleted {}", guid))
            }
            ActionType::Create | ActionType::Replace => {
                let config = desired_config(action)?;

                if action.action_type == ActionType::Replace {
                    let outcome = resource.delete(self.client, &mut current).await;
                    if let Err(e) = outcome {
                        state.set_resource(action.id.clone(), current);
                        return Err(e);
                    }
                }

                let outcome = resource.create(self.client, config, &mut current).await;
                self.record(action, state, current, config, outcome)
                    .map(|guid| format!("created {}", guid))
            }
            ActionType::Update => {
                let config = desired_config(action)?;
                let outcome = resource.update(self.client, config, &mut current).await;
                self.record(action, state, current, config, outcome)
                    .map(|guid| format!("updated {}", guid))
            }
        }
    }

    /// Store the outcome of a create/update. An integration that still
    /// exists is always kept in state, success or not.
    fn record(
        &self,
        action: &Action,
        state: &mut GlobalState,
        mut current: ResourceState,
        config: &serde_json::Value,
        outcome: Result<()>,
    ) -> Result<String> {
        if current.is_absent() {
            state.remove_resource(&action.id);
            outcome?;
            return Err(ProviderError::StateError(format!(
                "{} returned no integration id",
                action.id
            )));
        }

        if outcome.is_ok() {
            current.config = config.clone();
        }
        let guid = current.id.clone();
        state.set_resource(action.id.clone(), current);
        outcome.map(|()| guid)
    }
}

fn desired_config(action: &Action) -> Result<&serde_json::Value> {
    action.config.as_ref().ok_or_else(|| {
        ProviderError::invalid_config(&action.resource_type, "no configuration in plan")
    })
}
