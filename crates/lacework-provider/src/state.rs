//! State management for Lacework resources
//!
//! Manages the `.lwprov/state.json` file which mirrors what each managed
//! integration looked like after the last successful operation.

use crate::error::{ProviderError, Result};
use chrono::{DateTime, Utc};
use lacework_api::Integration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".lwprov";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// Key of a resource instance: `<resource_type>.<local name>`
pub fn state_key(resource_type: &str, name: &str) -> String {
    format!("{}.{}", resource_type, name)
}

/// All managed resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Resources indexed by `<resource_type>.<name>`
    pub resources: BTreeMap<String, ResourceState>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a resource
    pub fn set_resource(&mut self, key: String, state: ResourceState) {
        self.resources.insert(key, state);
        self.updated_at = Utc::now();
    }

    /// Remove a resource
    pub fn remove_resource(&mut self, key: &str) -> Option<ResourceState> {
        let result = self.resources.remove(key);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    pub fn get_resource(&self, key: &str) -> Option<&ResourceState> {
        self.resources.get(key)
    }

    /// Find the resource tracking a given guid
    pub fn find_by_id(&self, id: &str) -> Option<(&String, &ResourceState)> {
        self.resources.iter().find(|(_, r)| r.id == id)
    }
}

/// Local mirror of one integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Resource type, e.g. `lacework_alert_channel_slack`
    pub resource_type: String,

    /// Server-assigned guid; empty when the integration does not exist
    pub id: String,

    pub name: String,
    pub enabled: bool,
    pub type_name: String,
    pub org_level: bool,
    pub created_or_updated_time: String,
    pub created_or_updated_by: String,

    pub status: ResourceStatus,

    /// Type-specific settings as last seen remotely
    pub attributes: serde_json::Value,

    /// Configuration the resource was last applied with
    #[serde(default)]
    pub config: serde_json::Value,

    /// Last local sync
    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    /// Empty state for a resource that has not been created yet
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: String::new(),
            name: String::new(),
            enabled: false,
            type_name: String::new(),
            org_level: false,
            created_or_updated_time: String::new(),
            created_or_updated_by: String::new(),
            status: ResourceStatus::Unknown,
            attributes: serde_json::Value::Null,
            config: serde_json::Value::Null,
            updated_at: Utc::now(),
        }
    }

    /// True when no remote integration backs this state
    pub fn is_absent(&self) -> bool {
        self.id.is_empty()
    }

    /// Forget the remote integration.
    pub fn clear_id(&mut self) {
        self.id.clear();
        self.status = ResourceStatus::Deleted;
        self.updated_at = Utc::now();
    }

    /// Copy every field of `record` into this state.
    pub fn populate<D>(&mut self, record: &Integration<D>, attributes: serde_json::Value) {
        self.id = record.guid.clone();
        self.name = record.name.clone();
        self.enabled = record.enabled;
        self.type_name = record.type_name.clone();
        self.org_level = record.is_org;
        self.created_or_updated_time = record.created_or_updated_time.clone();
        self.created_or_updated_by = record.created_or_updated_by.clone();
        self.status = match (&record.state, record.enabled) {
            (_, false) => ResourceStatus::Disabled,
            (Some(state), true) if !state.ok => ResourceStatus::Error,
            _ => ResourceStatus::Active,
        };
        self.attributes = attributes;
        self.updated_at = Utc::now();
    }

    /// Keep tracking an integration whose record could not be read back.
    /// Only the identity is copied; the next plan replaces it.
    pub fn taint<D>(&mut self, record: &Integration<D>) {
        self.id = record.guid.clone();
        self.name = record.name.clone();
        self.enabled = record.enabled;
        self.type_name = record.type_name.clone();
        self.status = ResourceStatus::Tainted;
        self.updated_at = Utc::now();
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Status of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Enabled and reported healthy
    Active,
    /// Exists but disabled
    Disabled,
    /// Lacework reports the integration as failing
    Error,
    /// Failed verification and could not be rolled back
    Tainted,
    /// Removed remotely
    Deleted,
    /// Status is unknown
    Unknown,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Active => write!(f, "active"),
            ResourceStatus::Disabled => write!(f, "disabled"),
            ResourceStatus::Error => write!(f, "error"),
            ResourceStatus::Tainted => write!(f, "tainted"),
            ResourceStatus::Deleted => write!(f, "deleted"),
            ResourceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// State manager for reading/writing state files
pub struct StateManager {
    /// Project root directory
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    /// Path of the state file
    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the current state
    pub async fn load(&self) -> Result<GlobalState> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: GlobalState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(ProviderError::StateError(format!(
                "version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    /// Save the state, keeping the previous file as a backup
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }

    /// Acquire a lock for exclusive access
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();

        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            // Locks older than an hour are considered abandoned
            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < 1 {
                return Err(ProviderError::LockError(format!(
                    "state is locked by {} since {}",
                    lock_info.holder, lock_info.acquired_at
                )));
            }

            tracing::warn!("Removing stale lock from {}", lock_info.holder);
        }

        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            acquired_at: Utc::now(),
        };

        let content = serde_json::to_string_pretty(&lock_info)?;
        fs::write(&lock_path, content).await?;

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    /// Release the lock
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
