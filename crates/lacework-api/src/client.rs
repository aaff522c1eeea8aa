//! Lacework REST client
//!
//! Talks to the v1 external-integrations endpoints and the v2 alert channel
//! test endpoint. Authenticates once with an API key/secret pair and reuses
//! the issued bearer token for the lifetime of the client.

use crate::api::IntegrationsApi;
use crate::error::{ApiError, Result};
use crate::types::{ApiResponse, Integration, IntegrationType, IntegrationsResponse};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_DOMAIN: &str = "lacework.net";
const TOKEN_EXPIRY_SECS: u32 = 3600;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const INTEGRATIONS_PATH: &str = "v1/external/integrations";

/// Settings needed to build a client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Account name, e.g. `acme` for `acme.lacework.net`
    pub account: String,
    /// Sub-account to operate on, if any
    pub subaccount: Option<String>,
    pub api_key: String,
    pub api_secret: String,
    /// Override for the API root (defaults to `https://{account}.lacework.net/api`)
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        account: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            subaccount: None,
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_subaccount(mut self, subaccount: impl Into<String>) -> Self {
        self.subaccount = Some(subaccount.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// API root this configuration points at, without a trailing slash
    pub fn api_root(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}/api", self.account, DEFAULT_DOMAIN),
        }
    }
}

/// Lacework API client
pub struct LaceworkClient {
    http: reqwest::Client,
    api_root: String,
    token: String,
    subaccount: Option<String>,
}

impl LaceworkClient {
    /// Build a client and exchange the API key for an access token.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        if config.account.trim().is_empty() {
            return Err(ApiError::InvalidConfig("account is empty".to_string()));
        }
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(ApiError::InvalidConfig(
                "api_key and api_secret are required".to_string(),
            ));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let api_root = config.api_root();
        let token = request_token(&http, &api_root, &config).await?;

        tracing::debug!("Authenticated against {}", api_root);
        Ok(Self {
            http,
            api_root,
            token,
            subaccount: config.subaccount,
        })
    }

    /// Build a client around an already issued token.
    pub fn with_token(
        api_root: impl Into<String>,
        token: impl Into<String>,
        subaccount: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_root: api_root.into().trim_end_matches('/').to_string(),
            token: token.into(),
            subaccount,
        }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json");
        if let Some(subaccount) = &self.subaccount {
            builder = builder.header("Account-Name", subaccount);
        }
        builder
    }

    /// Send a request and decode the response envelope.
    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Integration>,
    ) -> Result<ApiResponse<T>> {
        let mut builder = self.request(method.clone(), url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!("{} {}", method, url);
        let response = check_status(builder.send().await?, &method, url).await?;
        let envelope: ApiResponse<T> = response.json().await?;

        if !envelope.ok {
            let message = if envelope.message.is_empty() {
                "Unknown error".to_string()
            } else {
                envelope.message
            };
            return Err(ApiError::ApiError(message));
        }

        Ok(envelope)
    }

    /// Send a request whose response body is irrelevant.
    async fn send_empty(&self, method: Method, url: &str) -> Result<()> {
        tracing::debug!("{} {}", method, url);
        let response = self.request(method.clone(), url).send().await?;
        check_status(response, &method, url).await?;
        Ok(())
    }
}

#[async_trait]
impl IntegrationsApi for LaceworkClient {
    async fn create(&self, integration: &Integration) -> Result<IntegrationsResponse> {
        let url = self.url(INTEGRATIONS_PATH);
        self.send_json(Method::POST, &url, Some(integration)).await
    }

    async fn get(&self, guid: &str) -> Result<IntegrationsResponse> {
        let url = self.url(&format!("{}/{}", INTEGRATIONS_PATH, guid));
        self.send_json(Method::GET, &url, None).await
    }

    async fn update(&self, integration: &Integration) -> Result<IntegrationsResponse> {
        if integration.guid.is_empty() {
            return Err(ApiError::InvalidConfig(
                "cannot update an integration without a guid".to_string(),
            ));
        }
        let url = self.url(&format!("{}/{}", INTEGRATIONS_PATH, integration.guid));
        self.send_json(Method::PATCH, &url, Some(integration)).await
    }

    async fn delete(&self, guid: &str) -> Result<()> {
        let url = self.url(&format!("{}/{}", INTEGRATIONS_PATH, guid));
        self.send_empty(Method::DELETE, &url).await
    }

    async fn test(&self, guid: &str) -> Result<()> {
        let url = self.url(&format!("v2/AlertChannels/{}/test", guid));
        self.send_empty(Method::POST, &url).await
    }

    async fn list(&self, integration_type: IntegrationType) -> Result<IntegrationsResponse> {
        let url = self.url(&format!(
            "{}/type/{}",
            INTEGRATIONS_PATH,
            integration_type.as_str()
        ));
        self.send_json(Method::GET, &url, None).await
    }
}

async fn request_token(
    http: &reqwest::Client,
    api_root: &str,
    config: &ClientConfig,
) -> Result<String> {
    let url = format!("{}/v1/access/tokens", api_root);
    let body = TokenRequest {
        key_id: config.api_key.clone(),
        expiry_time: TOKEN_EXPIRY_SECS,
    };

    let response = http
        .post(&url)
        .header("X-LW-UAKS", &config.api_secret)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        let text = response.text().await.unwrap_or_default();
        return Err(ApiError::AuthenticationFailed(error_message(&text, status)));
    }
    let response = check_status(response, &Method::POST, &url).await?;

    let envelope: ApiResponse<TokenData> = response.json().await?;
    envelope
        .data
        .into_iter()
        .next()
        .map(|t| t.token)
        .ok_or_else(|| ApiError::AuthenticationFailed("no token in response".to_string()))
}

async fn check_status(
    response: reqwest::Response,
    method: &Method,
    url: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(url.to_string()));
    }

    let text = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        method: method.to_string(),
        url: url.to_string(),
        status: status.as_u16(),
        message: error_message(&text, status),
    })
}

/// Pull a human readable message out of an error body.
fn error_message(body: &str, status: StatusCode) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        data: Option<ErrorData>,
    }

    #[derive(Deserialize)]
    struct ErrorData {
        #[serde(default)]
        message: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
            return message;
        }
        if let Some(message) = parsed.data.and_then(|d| d.message).filter(|m| !m.is_empty()) {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

// ============ API Types ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest {
    key_id: String,
    expiry_time: u32,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    token: String,
    #[allow(dead_code)]
    #[serde(rename = "expiresAt", default)]
    expires_at: String,
}
