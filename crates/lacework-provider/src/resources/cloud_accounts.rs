//! Cloud account integrations
//!
//! AWS and Azure integrations are usually created right after the IAM role,
//! queue or app registration they depend on, which Lacework cannot see until
//! it has propagated. Those kinds retry create.

use super::keep_secret;
use crate::error::Result;
use crate::resource::IntegrationKind;
use crate::schema::Validator;
use lacework_api::IntegrationType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsCredentials {
    pub role_arn: String,
    pub external_id: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CrossAccountCredentials {
    pub role_arn: String,
    pub external_id: String,
}

impl From<&AwsCredentials> for CrossAccountCredentials {
    fn from(c: &AwsCredentials) -> Self {
        Self {
            role_arn: c.role_arn.clone(),
            external_id: c.external_id.clone(),
        }
    }
}

fn validate_aws_credentials(c: &AwsCredentials, v: &mut Validator) {
    v.check(
        c.role_arn.starts_with("arn:"),
        format!("'credentials.role_arn' must be an ARN, got '{}'", c.role_arn),
    )
    .required("credentials.external_id", &c.external_id);
}

fn aws_credentials(data: CrossAccountCredentials, prior: Option<&AwsCredentials>) -> AwsCredentials {
    AwsCredentials {
        role_arn: data.role_arn,
        external_id: keep_secret(data.external_id, prior.map(|p| &p.external_id)),
    }
}

// AWS Config

pub struct AwsCfg;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsCfgSettings {
    pub credentials: AwsCredentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AwsCfgData {
    pub cross_account_credentials: CrossAccountCredentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,
}

impl IntegrationKind for AwsCfg {
    const RESOURCE_TYPE: &'static str = "lacework_integration_aws_cfg";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::AwsCfg;
    const RETRY_CREATE: bool = true;
    type Settings = AwsCfgSettings;
    type Data = AwsCfgData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        validate_aws_credentials(&settings.credentials, v);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        AwsCfgData {
            cross_account_credentials: (&settings.credentials).into(),
            aws_account_id: settings.aws_account_id.clone(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(AwsCfgSettings {
            credentials: aws_credentials(
                data.cross_account_credentials,
                prior.map(|p| &p.credentials),
            ),
            aws_account_id: data.aws_account_id,
        })
    }
}

// AWS CloudTrail

pub struct AwsCt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsCtSettings {
    pub queue_url: String,
    pub credentials: AwsCredentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AwsCtData {
    pub queue_url: String,
    pub cross_account_credentials: CrossAccountCredentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,
}

impl IntegrationKind for AwsCt {
    const RESOURCE_TYPE: &'static str = "lacework_integration_aws_ct";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::AwsCtSqs;
    const RETRY_CREATE: bool = true;
    type Settings = AwsCtSettings;
    type Data = AwsCtData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.url("queue_url", &settings.queue_url);
        validate_aws_credentials(&settings.credentials, v);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        AwsCtData {
            queue_url: settings.queue_url.clone(),
            cross_account_credentials: (&settings.credentials).into(),
            aws_account_id: settings.aws_account_id.clone(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(AwsCtSettings {
            queue_url: data.queue_url,
            credentials: aws_credentials(
                data.cross_account_credentials,
                prior.map(|p| &p.credentials),
            ),
            aws_account_id: data.aws_account_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzureCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AzureCredentialsData {
    pub client_id: String,
    pub client_secret: String,
}

fn validate_azure(credentials: &AzureCredentials, tenant_id: &str, v: &mut Validator) {
    v.required("credentials.client_id", &credentials.client_id)
        .required("credentials.client_secret", &credentials.client_secret)
        .required("tenant_id", tenant_id);
}

fn azure_data(c: &AzureCredentials) -> AzureCredentialsData {
    AzureCredentialsData {
        client_id: c.client_id.clone(),
        client_secret: c.client_secret.clone(),
    }
}

fn azure_credentials(data: AzureCredentialsData, prior: Option<&AzureCredentials>) -> AzureCredentials {
    AzureCredentials {
        client_id: data.client_id,
        client_secret: keep_secret(data.client_secret, prior.map(|p| &p.client_secret)),
    }
}

// Azure Config

pub struct AzureCfg;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzureCfgSettings {
    pub tenant_id: String,
    pub credentials: AzureCredentials,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AzureCfgData {
    pub tenant_id: String,
    pub credentials: AzureCredentialsData,
}

impl IntegrationKind for AzureCfg {
    const RESOURCE_TYPE: &'static str = "lacework_integration_azure_cfg";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::AzureCfg;
    const RETRY_CREATE: bool = true;
    type Settings = AzureCfgSettings;
    type Data = AzureCfgData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        validate_azure(&settings.credentials, &settings.tenant_id, v);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        AzureCfgData {
            tenant_id: settings.tenant_id.clone(),
            credentials: azure_data(&settings.credentials),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(AzureCfgSettings {
            tenant_id: data.tenant_id,
            credentials: azure_credentials(data.credentials, prior.map(|p| &p.credentials)),
        })
    }
}

// Azure Activity Log

pub struct AzureAl;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzureAlSettings {
    pub tenant_id: String,
    pub queue_url: String,
    pub credentials: AzureCredentials,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AzureAlData {
    pub tenant_id: String,
    pub queue_url: String,
    pub credentials: AzureCredentialsData,
}

impl IntegrationKind for AzureAl {
    const RESOURCE_TYPE: &'static str = "lacework_integration_azure_al";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::AzureAlSeq;
    const RETRY_CREATE: bool = true;
    type Settings = AzureAlSettings;
    type Data = AzureAlData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        validate_azure(&settings.credentials, &settings.tenant_id, v);
        v.url("queue_url", &settings.queue_url);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        AzureAlData {
            tenant_id: settings.tenant_id.clone(),
            queue_url: settings.queue_url.clone(),
            credentials: azure_data(&settings.credentials),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(AzureAlSettings {
            tenant_id: data.tenant_id,
            queue_url: data.queue_url,
            credentials: azure_credentials(data.credentials, prior.map(|p| &p.credentials)),
        })
    }
}

const GCP_RESOURCE_LEVELS: &[&str] = &["PROJECT", "ORGANIZATION"];

fn default_resource_level() -> String {
    "PROJECT".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcpCredentials {
    pub client_id: String,
    pub client_email: String,
    pub private_key_id: String,
    pub private_key: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GcpCredentialsData {
    pub client_id: String,
    pub client_email: String,
    pub private_key_id: String,
    pub private_key: String,
}

fn validate_gcp(level: &str, resource_id: &str, c: &GcpCredentials, v: &mut Validator) {
    v.one_of("resource_level", level, GCP_RESOURCE_LEVELS)
        .required("resource_id", resource_id)
        .required("credentials.client_id", &c.client_id)
        .check(
            c.client_email.contains('@'),
            "'credentials.client_email' must be a service account email",
        )
        .required("credentials.private_key_id", &c.private_key_id)
        .required("credentials.private_key", &c.private_key);
}

fn gcp_data(c: &GcpCredentials) -> GcpCredentialsData {
    GcpCredentialsData {
        client_id: c.client_id.clone(),
        client_email: c.client_email.clone(),
        private_key_id: c.private_key_id.clone(),
        private_key: c.private_key.clone(),
    }
}

fn gcp_credentials(data: GcpCredentialsData, prior: Option<&GcpCredentials>) -> GcpCredentials {
    GcpCredentials {
        client_id: data.client_id,
        client_email: data.client_email,
        private_key_id: data.private_key_id,
        private_key: keep_secret(data.private_key, prior.map(|p| &p.private_key)),
    }
}

// GCP Config

pub struct GcpCfg;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcpCfgSettings {
    #[serde(default = "default_resource_level")]
    pub resource_level: String,
    pub resource_id: String,
    pub credentials: GcpCredentials,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GcpCfgData {
    pub id_type: String,
    pub id: String,
    pub credentials: GcpCredentialsData,
}

impl IntegrationKind for GcpCfg {
    const RESOURCE_TYPE: &'static str = "lacework_integration_gcp_cfg";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::GcpCfg;
    type Settings = GcpCfgSettings;
    type Data = GcpCfgData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        validate_gcp(
            &settings.resource_level,
            &settings.resource_id,
            &settings.credentials,
            v,
        );
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        GcpCfgData {
            id_type: settings.resource_level.clone(),
            id: settings.resource_id.clone(),
            credentials: gcp_data(&settings.credentials),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(GcpCfgSettings {
            resource_level: data.id_type,
            resource_id: data.id,
            credentials: gcp_credentials(data.credentials, prior.map(|p| &p.credentials)),
        })
    }
}

// GCP Audit Log

pub struct GcpAt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcpAtSettings {
    #[serde(default = "default_resource_level")]
    pub resource_level: String,
    pub resource_id: String,
    pub subscription: String,
    pub credentials: GcpCredentials,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GcpAtData {
    pub id_type: String,
    pub id: String,
    pub subscription_name: String,
    pub credentials: GcpCredentialsData,
}

impl IntegrationKind for GcpAt {
    const RESOURCE_TYPE: &'static str = "lacework_integration_gcp_at";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::GcpAtSes;
    type Settings = GcpAtSettings;
    type Data = GcpAtData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        validate_gcp(
            &settings.resource_level,
            &settings.resource_id,
            &settings.credentials,
            v,
        );
        v.required("subscription", &settings.subscription);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        GcpAtData {
            id_type: settings.resource_level.clone(),
            id: settings.resource_id.clone(),
            subscription_name: settings.subscription.clone(),
            credentials: gcp_data(&settings.credentials),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(GcpAtSettings {
            resource_level: data.id_type,
            resource_id: data.id,
            subscription: data.subscription_name,
            credentials: gcp_credentials(data.credentials, prior.map(|p| &p.credentials)),
        })
    }
}
