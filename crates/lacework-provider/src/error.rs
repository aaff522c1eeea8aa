//! Provider error types

use lacework_api::{ApiError, IntegrationType};
use thiserror::Error;

/// Where operators are sent when the API breaks its own contract
pub const SUPPORT_URL: &str = "https://github.com/lacework-community/lacework-provider-rs/issues";

/// Provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("integration {guid} failed its test and was deleted: {source}")]
    VerificationFailed {
        guid: String,
        #[source]
        source: ApiError,
    },

    #[error(
        "integration {guid} failed its test ({test}) and could not be deleted, \
         it is still present in Lacework: {delete}"
    )]
    RollbackFailed {
        guid: String,
        test: ApiError,
        #[source]
        delete: ApiError,
    },

    #[error(
        "unexpected empty response from the Lacework API.\n\n\
         Verify the state of the integration in your account and report this issue:\n  {}",
        SUPPORT_URL
    )]
    EmptyResponse,

    #[error("{}", multiple_records_message(.records))]
    MultipleRecords {
        /// `(guid, name)` of every returned record
        records: Vec<(String, String)>,
    },

    #[error("unable to create {integration_type} integration after {attempts} attempts: {source}")]
    RetriesExhausted {
        integration_type: IntegrationType,
        attempts: u32,
        #[source]
        source: ApiError,
    },

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("invalid configuration for {resource_type}: {message}")]
    InvalidConfig {
        resource_type: String,
        message: String,
    },

    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("integration not found: {0}")]
    NotFound(String),

    #[error("integration {guid} is of type {actual}, expected {expected}")]
    TypeMismatch {
        guid: String,
        expected: String,
        actual: String,
    },

    #[error("state file error: {0}")]
    StateError(String),

    #[error("lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn invalid_config(resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::InvalidConfig {
            resource_type: resource_type.into(),
            message: message.into(),
        }
    }
}

fn multiple_records_message(records: &[(String, String)]) -> String {
    let mut message = String::from(
        "unexpected multiple records in the Lacework API response for a single integration:\n",
    );
    for (guid, name) in records {
        message.push_str(&format!("  - guid: {}, name: {}\n", guid, name));
    }
    message.push_str(&format!(
        "\nVerify the state of these integrations in your account and report this issue:\n  {}",
        SUPPORT_URL
    ));
    message
}

pub type Result<T> = std::result::Result<T, ProviderError>;
