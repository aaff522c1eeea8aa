pub mod error;

pub use error::*;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const ENV_ACCOUNT: &str = "LW_ACCOUNT";
pub const ENV_SUBACCOUNT: &str = "LW_SUBACCOUNT";
pub const ENV_API_KEY: &str = "LW_API_KEY";
pub const ENV_API_SECRET: &str = "LW_API_SECRET";
pub const ENV_PROFILE: &str = "LW_PROFILE";
pub const ENV_CONFIG: &str = "LW_CONFIG";

pub const DEFAULT_PROFILE: &str = "default";
const CONFIG_FILE: &str = ".lacework.toml";

/// One `[profile]` table of `~/.lacework.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    pub account: Option<String>,
    pub subaccount: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

/// Values supplied explicitly (CLI flags); they win over everything else
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub account: Option<String>,
    pub subaccount: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub profile: Option<String>,
}

/// Fully resolved provider credentials
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub account: String,
    pub subaccount: Option<String>,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("account", &self.account)
            .field("subaccount", &self.subaccount)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Path of the Lacework CLI configuration file
///
/// `LW_CONFIG` takes precedence over `~/.lacework.toml`.
pub fn config_file_path() -> Result<PathBuf> {
    if let Some(path) = env(ENV_CONFIG) {
        return Ok(PathBuf::from(path));
    }
    let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
    Ok(home.join(CONFIG_FILE))
}

/// Read every profile in a configuration file. A missing file has no profiles.
pub fn load_profiles(path: &Path) -> Result<BTreeMap<String, Profile>> {
    if !path.exists() {
        tracing::debug!("Config file not found: {}", path.display());
        return Ok(BTreeMap::new());
    }

    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve credentials
///
/// Precedence, highest first:
/// 1. explicit overrides (flags)
/// 2. `LW_ACCOUNT`, `LW_SUBACCOUNT`, `LW_API_KEY`, `LW_API_SECRET`
/// 3. the selected profile (`--profile`, `LW_PROFILE`, then `default`)
pub fn resolve(overrides: &ConfigOverrides) -> Result<ProviderConfig> {
    let path = config_file_path()?;
    let mut profiles = load_profiles(&path)?;

    let requested = overrides.profile.clone().or_else(|| env(ENV_PROFILE));
    let profile_name = requested.clone().unwrap_or_else(|| DEFAULT_PROFILE.to_string());

    let profile = match profiles.remove(&profile_name) {
        Some(profile) => profile,
        None if requested.is_some() => {
            return Err(ConfigError::ProfileNotFound {
                profile: profile_name,
                path,
            });
        }
        None => Profile::default(),
    };
    tracing::debug!("Using profile '{}'", profile_name);

    let account = pick(&overrides.account, ENV_ACCOUNT, &profile.account).ok_or(
        ConfigError::MissingSetting {
            setting: "account",
            flag: "account",
            env: ENV_ACCOUNT,
        },
    )?;
    let api_key = pick(&overrides.api_key, ENV_API_KEY, &profile.api_key).ok_or(
        ConfigError::MissingSetting {
            setting: "api_key",
            flag: "api-key",
            env: ENV_API_KEY,
        },
    )?;
    let api_secret = pick(&overrides.api_secret, ENV_API_SECRET, &profile.api_secret).ok_or(
        ConfigError::MissingSetting {
            setting: "api_secret",
            flag: "api-secret",
            env: ENV_API_SECRET,
        },
    )?;
    let subaccount = pick(&overrides.subaccount, ENV_SUBACCOUNT, &profile.subaccount)
        .map(|s| normalize_account(&s));

    Ok(ProviderConfig {
        account: normalize_account(&account),
        subaccount,
        api_key,
        api_secret,
    })
}

/// `https://acme.lacework.net` and `acme.lacework.net` both become `acme`.
pub fn normalize_account(raw: &str) -> String {
    let trimmed = raw
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    trimmed
        .strip_suffix(".lacework.net")
        .unwrap_or(trimmed)
        .to_lowercase()
}

fn pick(explicit: &Option<String>, env_name: &str, profile: &Option<String>) -> Option<String> {
    explicit
        .clone()
        .filter(|v| !v.is_empty())
        .or_else(|| env(env_name))
        .or_else(|| profile.clone().filter(|v| !v.is_empty()))
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    const PROFILES: &str = r#"
[default]
account = "acme.lacework.net"
api_key = "ACME_DEFAULT"
api_secret = "_default_secret"

[staging]
account = "acme-stg"
subaccount = "StagingTeam"
api_key = "ACME_STG"
api_secret = "_stg_secret"
"#;

    fn clear_env<'a>() -> Vec<(&'static str, Option<&'a str>)> {
        vec![
            (ENV_ACCOUNT, None),
            (ENV_SUBACCOUNT, None),
            (ENV_API_KEY, None),
            (ENV_API_SECRET, None),
            (ENV_PROFILE, None),
        ]
    }

    fn write_profiles(dir: &Path) -> PathBuf {
        let path = dir.join("lacework.toml");
        fs::write(&path, PROFILES).unwrap();
        path
    }

    #[test]
    fn test_normalize_account() {
        assert_eq!(normalize_account("acme"), "acme");
        assert_eq!(normalize_account("ACME.lacework.net"), "acme");
        assert_eq!(normalize_account("https://acme.lacework.net/"), "acme");
    }

    #[test]
    fn test_load_profiles_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profiles = load_profiles(&temp_dir.path().join("nope.toml")).unwrap();
        assert!(profiles.is_empty());
    }

    #[test]
    fn test_load_profiles_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[default\naccount = ").unwrap();

        match load_profiles(&path) {
            Err(ConfigError::Parse { .. }) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_resolve_default_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_profiles(temp_dir.path());

        let mut vars = clear_env();
        vars.push((ENV_CONFIG, path.to_str()));
        let config = temp_env::with_vars(vars, || resolve(&ConfigOverrides::default())).unwrap();

        assert_eq!(config.account, "acme");
        assert_eq!(config.api_key, "ACME_DEFAULT");
        assert_eq!(config.api_secret, "_default_secret");
        assert_eq!(config.subaccount, None);
    }

    #[test]
    #[serial]
    fn test_resolve_named_profile_from_env() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_profiles(temp_dir.path());

        let mut vars = clear_env();
        vars.push((ENV_CONFIG, path.to_str()));
        vars.push((ENV_PROFILE, Some("staging")));
        let config = temp_env::with_vars(vars, || resolve(&ConfigOverrides::default())).unwrap();

        assert_eq!(config.account, "acme-stg");
        assert_eq!(config.subaccount.as_deref(), Some("stagingteam"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_profile_and_flags_override_env() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_profiles(temp_dir.path());

        let mut vars = clear_env();
        vars.push((ENV_CONFIG, path.to_str()));
        vars.push((ENV_API_KEY, Some("ENV_KEY")));
        vars.push((ENV_ACCOUNT, Some("from-env")));

        let overrides = ConfigOverrides {
            account: Some("from-flag".to_string()),
            ..Default::default()
        };
        let config = temp_env::with_vars(vars, || resolve(&overrides)).unwrap();

        assert_eq!(config.account, "from-flag");
        assert_eq!(config.api_key, "ENV_KEY");
        assert_eq!(config.api_secret, "_default_secret");
    }

    #[test]
    #[serial]
    fn test_unknown_profile_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_profiles(temp_dir.path());

        let mut vars = clear_env();
        vars.push((ENV_CONFIG, path.to_str()));
        let overrides = ConfigOverrides {
            profile: Some("prod".to_string()),
            ..Default::default()
        };
        let result = temp_env::with_vars(vars, || resolve(&overrides));

        if let Err(ConfigError::ProfileNotFound { profile, .. }) = result {
            assert_eq!(profile, "prod");
        } else {
            panic!("Expected ProfileNotFound error");
        }
    }

    #[test]
    #[serial]
    fn test_missing_secret() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.toml");

        let mut vars = clear_env();
        vars.push((ENV_CONFIG, missing.to_str()));
        vars.push((ENV_ACCOUNT, Some("acme")));
        vars.push((ENV_API_KEY, Some("KEY")));
        let result = temp_env::with_vars(vars, || resolve(&ConfigOverrides::default()));

        match result {
            Err(ConfigError::MissingSetting { setting, env, .. }) => {
                assert_eq!(setting, "api_secret");
                assert_eq!(env, ENV_API_SECRET);
            }
            other => panic!("Expected MissingSetting error, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ProviderConfig {
            account: "acme".to_string(),
            subaccount: None,
            api_key: "KEY".to_string(),
            api_secret: "very-secret".to_string(),
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
