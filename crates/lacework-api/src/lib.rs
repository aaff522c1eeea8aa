//! Lacework integrations API client
//!
//! A thin client over the Lacework REST API covering what the provider
//! needs: create, read, update, delete, list and test integrations.
//!
//! # Example
//!
//! ```ignore
//! use lacework_api::{ClientConfig, IntegrationsApi, LaceworkClient};
//!
//! let config = ClientConfig::new("acme", "ACME_1234", "_secret");
//! let client = LaceworkClient::connect(config).await?;
//!
//! let response = client.get("ACME_ABCDEF0123456789").await?;
//! for record in response.data {
//!     println!("{} ({})", record.name, record.integration_type);
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::IntegrationsApi;
pub use client::{ClientConfig, LaceworkClient};
pub use error::{ApiError, Result};
pub use types::{
    ApiResponse, Category, Integration, IntegrationState, IntegrationType, IntegrationsResponse,
};
