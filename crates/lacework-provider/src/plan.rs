//! Planning: desired resources vs local state

use crate::state::{GlobalState, ResourceState, ResourceStatus, state_key};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One resource as declared by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredResource {
    /// Resource type, e.g. `lacework_alert_channel_slack`
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Local name, unique per type
    pub name: String,

    /// Resource configuration
    #[serde(default)]
    pub config: serde_json::Value,
}

impl DesiredResource {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            config,
        }
    }

    /// State key (`type.name`)
    pub fn key(&self) -> String {
        state_key(&self.resource_type, &self.name)
    }
}

/// Represents a planned action for a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// State key of the resource
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    pub resource_type: String,

    /// Local resource name
    pub name: String,

    /// Description of the action
    pub description: String,

    /// Configuration to apply; `None` for deletes
    pub config: Option<serde_json::Value>,
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new integration
    Create,
    /// Update an existing integration
    Update,
    /// Delete an integration
    Delete,
    /// Delete a tainted integration and create it again
    Replace,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::Replace => write!(f, "replace"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of applying actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied actions
    pub succeeded: Vec<ActionResult>,

    /// Failed actions
    pub failed: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, action_id: String, message: String) {
        self.succeeded.push(ActionResult {
            action_id,
            success: true,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, action_id: String, error: String) {
        self.failed.push(ActionResult {
            action_id,
            success: false,
            message: String::new(),
            error: Some(error),
        });
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// ID of the action
    pub action_id: String,

    pub success: bool,

    pub message: String,

    pub error: Option<String>,
}

/// Actions to bring Lacework in line with the desired resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
            has_changes: false,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            replace: self.actions_by_type(ActionType::Replace).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to replace, {} to delete, {} unchanged",
            self.create, self.update, self.replace, self.delete, self.no_change
        )
    }
}

/// Plan the actions that turn `state` into `desired`.
///
/// State entries with no desired counterpart are deleted.
pub fn plan_apply(desired: &[DesiredResource], state: &GlobalState) -> Plan {
    let mut actions = Vec::new();
    let mut wanted = BTreeSet::new();

    for resource in desired {
        let key = resource.key();
        wanted.insert(key.clone());

        let (action_type, description) = match state.get_resource(&key) {
            None => (ActionType::Create, format!("create {}", key)),
            Some(current) if current.is_absent() => (ActionType::Create, format!("create {}", key)),
            Some(current) if current.status == ResourceStatus::Tainted => (
                ActionType::Replace,
                format!("replace tainted {} ({})", key, current.id),
            ),
            Some(current) => match drift(current, &resource.config) {
                Some(reason) => (
                    ActionType::Update,
                    format!("update {} ({}): {}", key, current.id, reason),
                ),
                None => (ActionType::NoOp, format!("{} is up to date", key)),
            },
        };

        actions.push(Action {
            id: key,
            action_type,
            resource_type: resource.resource_type.clone(),
            name: resource.name.clone(),
            description,
            config: Some(resource.config.clone()),
        });
    }

    for (key, current) in &state.resources {
        if wanted.contains(key) || current.is_absent() {
            continue;
        }
        actions.push(delete_action(key, current));
    }

    Plan::new(actions)
}

/// Plan the deletion of every tracked integration.
pub fn plan_destroy(state: &GlobalState) -> Plan {
    Plan::new(
        state
            .resources
            .iter()
            .filter(|(_, current)| !current.is_absent())
            .map(|(key, current)| delete_action(key, current))
            .collect(),
    )
}

fn delete_action(key: &str, current: &ResourceState) -> Action {
    let name = key
        .strip_prefix(&format!("{}.", current.resource_type))
        .unwrap_or(key)
        .to_string();
    Action {
        id: key.to_string(),
        action_type: ActionType::Delete,
        resource_type: current.resource_type.clone(),
        name,
        description: format!("delete {} ({})", key, current.id),
        config: None,
    }
}

/// Why `current` no longer matches `config`, if it doesn't.
fn drift(current: &ResourceState, config: &serde_json::Value) -> Option<String> {
    if current.config != *config {
        return Some("configuration changed".to_string());
    }

    if let Some(name) = config.get("name").and_then(|v| v.as_str())
        && current.name != name
    {
        return Some(format!("name is '{}' in Lacework", current.name));
    }

    let enabled = config
        .get("enabled")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    if current.enabled != enabled {
        return Some(format!(
            "integration is {} in Lacework",
            if current.enabled { "enabled" } else { "disabled" }
        ));
    }

    None
}
