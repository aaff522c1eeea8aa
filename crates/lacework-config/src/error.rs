use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("home directory not found")]
    HomeDirNotFound,

    #[error(
        "missing required setting '{setting}'. Set it with one of:\n\
        - the --{flag} flag\n\
        - the {env} environment variable\n\
        - a profile in ~/.lacework.toml (override the path with LW_CONFIG)"
    )]
    MissingSetting {
        setting: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("profile '{profile}' not found in {}", path.display())]
    ProfileNotFound { profile: String, path: PathBuf },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
