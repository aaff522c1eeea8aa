//! Lacework API error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("[{method}] {url}\n  [{status}] {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    #[error("integration not found: {0}")]
    NotFound(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the remote record does not exist (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::NotFound(_) => true,
            ApiError::Status { status, .. } => *status == 404,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
