//! Container registry integrations
//!
//! All registries share the `CONT_VULN_CFG` integration type and are told
//! apart by `REGISTRY_TYPE` inside `DATA`.

use super::keep_secret;
use crate::error::{ProviderError, Result};
use crate::resource::IntegrationKind;
use crate::schema::Validator;
use lacework_api::IntegrationType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const IMAGE_LIMITS: &[u32] = &[5, 10, 15];

fn default_num_images() -> u32 {
    5
}

/// Scan limits every registry accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanLimits {
    #[serde(default)]
    pub limit_by_tags: Vec<String>,
    #[serde(default)]
    pub limit_by_labels: BTreeMap<String, String>,
    #[serde(default = "default_num_images")]
    pub limit_num_imgs: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ScanLimitsData {
    #[serde(default)]
    pub limit_by_tag: Vec<String>,
    #[serde(default)]
    pub limit_by_label: Vec<BTreeMap<String, String>>,
    #[serde(default = "default_num_images")]
    pub limit_num_img: u32,
}

impl ScanLimits {
    fn validate(&self, v: &mut Validator) {
        v.check(
            IMAGE_LIMITS.contains(&self.limit_num_imgs),
            format!(
                "'limit_num_imgs' must be one of 5, 10 or 15, got {}",
                self.limit_num_imgs
            ),
        );
    }

    fn to_data(&self) -> ScanLimitsData {
        ScanLimitsData {
            limit_by_tag: self.limit_by_tags.clone(),
            limit_by_label: self
                .limit_by_labels
                .iter()
                .map(|(k, v)| BTreeMap::from([(k.clone(), v.clone())]))
                .collect(),
            limit_num_img: self.limit_num_imgs,
        }
    }
}

impl From<ScanLimitsData> for ScanLimits {
    fn from(data: ScanLimitsData) -> Self {
        Self {
            limit_by_tags: data.limit_by_tag,
            limit_by_labels: data.limit_by_label.into_iter().flatten().collect(),
            limit_num_imgs: data.limit_num_img,
        }
    }
}

fn check_registry_type(expected: &str, actual: &str) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ProviderError::TypeMismatch {
            guid: String::new(),
            expected: format!("{} {}", IntegrationType::ContVulnCfg, expected),
            actual: format!("{} {}", IntegrationType::ContVulnCfg, actual),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BasicCredentialsData {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl: Option<bool>,
}

fn basic_data(c: &BasicCredentials, ssl: Option<bool>) -> BasicCredentialsData {
    BasicCredentialsData {
        username: c.username.clone(),
        password: c.password.clone(),
        ssl,
    }
}

fn basic_credentials(data: BasicCredentialsData, prior: Option<&BasicCredentials>) -> BasicCredentials {
    BasicCredentials {
        username: data.username,
        password: keep_secret(data.password, prior.map(|p| &p.password)),
    }
}

fn validate_basic(c: &BasicCredentials, v: &mut Validator) {
    v.required("username", &c.username)
        .required("password", &c.password);
}

// Docker Hub

pub struct DockerHub;

const DOCKERHUB: &str = "DOCKERHUB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerHubSettings {
    #[serde(flatten)]
    pub credentials: BasicCredentials,
    #[serde(flatten)]
    pub limits: ScanLimits,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DockerHubData {
    pub registry_type: String,
    pub registry_domain: String,
    pub credentials: BasicCredentialsData,
    #[serde(flatten)]
    pub limits: ScanLimitsData,
}

impl IntegrationKind for DockerHub {
    const RESOURCE_TYPE: &'static str = "lacework_integration_docker_hub";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::ContVulnCfg;
    type Settings = DockerHubSettings;
    type Data = DockerHubData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        validate_basic(&settings.credentials, v);
        settings.limits.validate(v);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        DockerHubData {
            registry_type: DOCKERHUB.to_string(),
            registry_domain: "index.docker.io".to_string(),
            credentials: basic_data(&settings.credentials, None),
            limits: settings.limits.to_data(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        check_registry_type(DOCKERHUB, &data.registry_type)?;
        Ok(DockerHubSettings {
            credentials: basic_credentials(data.credentials, prior.map(|p| &p.credentials)),
            limits: data.limits.into(),
        })
    }
}

// Docker V2

pub struct DockerV2;

const V2_REGISTRY: &str = "V2_REGISTRY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerV2Settings {
    pub registry_domain: String,
    #[serde(flatten)]
    pub credentials: BasicCredentials,
    #[serde(default)]
    pub ssl: bool,
    #[serde(flatten)]
    pub limits: ScanLimits,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DockerV2Data {
    pub registry_type: String,
    pub registry_domain: String,
    pub credentials: BasicCredentialsData,
    #[serde(flatten)]
    pub limits: ScanLimitsData,
}

impl IntegrationKind for DockerV2 {
    const RESOURCE_TYPE: &'static str = "lacework_integration_docker_v2";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::ContVulnCfg;
    type Settings = DockerV2Settings;
    type Data = DockerV2Data;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.required("registry_domain", &settings.registry_domain);
        validate_basic(&settings.credentials, v);
        settings.limits.validate(v);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        DockerV2Data {
            registry_type: V2_REGISTRY.to_string(),
            registry_domain: settings.registry_domain.clone(),
            credentials: basic_data(&settings.credentials, Some(settings.ssl)),
            limits: settings.limits.to_data(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        check_registry_type(V2_REGISTRY, &data.registry_type)?;
        let ssl = data.credentials.ssl.unwrap_or_default();
        Ok(DockerV2Settings {
            registry_domain: data.registry_domain,
            credentials: basic_credentials(data.credentials, prior.map(|p| &p.credentials)),
            ssl,
            limits: data.limits.into(),
        })
    }
}

// Amazon ECR

pub struct Ecr;

const AWS_ECR: &str = "AWS_ECR";
const AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcrSettings {
    pub registry_domain: String,
    pub credentials: EcrCredentials,
    #[serde(flatten)]
    pub limits: ScanLimits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcrCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EcrData {
    pub registry_type: String,
    pub registry_domain: String,
    pub aws_auth_type: String,
    pub access_key_credentials: EcrCredentialsData,
    #[serde(flatten)]
    pub limits: ScanLimitsData,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EcrCredentialsData {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl IntegrationKind for Ecr {
    const RESOURCE_TYPE: &'static str = "lacework_integration_ecr";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::ContVulnCfg;
    type Settings = EcrSettings;
    type Data = EcrData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.check(
            settings.registry_domain.contains(".dkr.ecr."),
            format!(
                "'registry_domain' must be an ECR domain, got '{}'",
                settings.registry_domain
            ),
        )
        .required(
            "credentials.access_key_id",
            &settings.credentials.access_key_id,
        )
        .required(
            "credentials.secret_access_key",
            &settings.credentials.secret_access_key,
        );
        settings.limits.validate(v);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        EcrData {
            registry_type: AWS_ECR.to_string(),
            registry_domain: settings.registry_domain.clone(),
            aws_auth_type: AWS_ACCESS_KEY.to_string(),
            access_key_credentials: EcrCredentialsData {
                access_key_id: settings.credentials.access_key_id.clone(),
                secret_access_key: settings.credentials.secret_access_key.clone(),
            },
            limits: settings.limits.to_data(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        check_registry_type(AWS_ECR, &data.registry_type)?;
        let keys = data.access_key_credentials;
        Ok(EcrSettings {
            registry_domain: data.registry_domain,
            credentials: EcrCredentials {
                access_key_id: keys.access_key_id,
                secret_access_key: keep_secret(
                    keys.secret_access_key,
                    prior.map(|p| &p.credentials.secret_access_key),
                ),
            },
            limits: data.limits.into(),
        })
    }
}

// Google Container Registry

pub struct Gcr;

const GCP_GCR: &str = "GCP_GCR";
const GCR_DOMAINS: &[&str] = &["gcr.io", "us.gcr.io", "eu.gcr.io", "asia.gcr.io"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcrSettings {
    pub registry_domain: String,
    pub credentials: GcrCredentials,
    #[serde(flatten)]
    pub limits: ScanLimits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcrCredentials {
    pub client_id: String,
    pub client_email: String,
    pub private_key_id: String,
    pub private_key: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GcrData {
    pub registry_type: String,
    pub registry_domain: String,
    pub credentials: GcrCredentialsData,
    #[serde(flatten)]
    pub limits: ScanLimitsData,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GcrCredentialsData {
    pub client_id: String,
    pub client_email: String,
    pub private_key_id: String,
    pub private_key: String,
}

impl IntegrationKind for Gcr {
    const RESOURCE_TYPE: &'static str = "lacework_integration_gcr";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::ContVulnCfg;
    type Settings = GcrSettings;
    type Data = GcrData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        let c = &settings.credentials;
        v.one_of("registry_domain", &settings.registry_domain, GCR_DOMAINS)
            .required("credentials.client_id", &c.client_id)
            .required("credentials.client_email", &c.client_email)
            .required("credentials.private_key_id", &c.private_key_id)
            .required("credentials.private_key", &c.private_key);
        settings.limits.validate(v);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        let c = &settings.credentials;
        GcrData {
            registry_type: GCP_GCR.to_string(),
            registry_domain: settings.registry_domain.clone(),
            credentials: GcrCredentialsData {
                client_id: c.client_id.clone(),
                client_email: c.client_email.clone(),
                private_key_id: c.private_key_id.clone(),
                private_key: c.private_key.clone(),
            },
            limits: settings.limits.to_data(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        check_registry_type(GCP_GCR, &data.registry_type)?;
        let c = data.credentials;
        Ok(GcrSettings {
            registry_domain: data.registry_domain,
            credentials: GcrCredentials {
                client_id: c.client_id,
                client_email: c.client_email,
                private_key_id: c.private_key_id,
                private_key: keep_secret(
                    c.private_key,
                    prior.map(|p| &p.credentials.private_key),
                ),
            },
            limits: data.limits.into(),
        })
    }
}

// GitHub Container Registry

pub struct Ghcr;

const GHCR: &str = "GHCR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhcrSettings {
    #[serde(flatten)]
    pub credentials: BasicCredentials,
    #[serde(default = "default_ssl")]
    pub ssl: bool,
    #[serde(flatten)]
    pub limits: ScanLimits,
}

fn default_ssl() -> bool {
    true
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GhcrData {
    pub registry_type: String,
    pub registry_domain: String,
    pub credentials: BasicCredentialsData,
    #[serde(flatten)]
    pub limits: ScanLimitsData,
}

impl IntegrationKind for Ghcr {
    const RESOURCE_TYPE: &'static str = "lacework_integration_ghcr";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::ContVulnCfg;
    type Settings = GhcrSettings;
    type Data = GhcrData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        validate_basic(&settings.credentials, v);
        settings.limits.validate(v);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        GhcrData {
            registry_type: GHCR.to_string(),
            registry_domain: "ghcr.io".to_string(),
            credentials: basic_data(&settings.credentials, Some(settings.ssl)),
            limits: settings.limits.to_data(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        check_registry_type(GHCR, &data.registry_type)?;
        let ssl = data.credentials.ssl.unwrap_or(true);
        Ok(GhcrSettings {
            credentials: basic_credentials(data.credentials, prior.map(|p| &p.credentials)),
            ssl,
            limits: data.limits.into(),
        })
    }
}
