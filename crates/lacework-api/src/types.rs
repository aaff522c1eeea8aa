//! Integration records as exchanged with the Lacework API

use serde::{Deserialize, Serialize};

/// Top-level grouping of integration types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AlertChannel,
    CloudAccount,
    ContainerRegistry,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::AlertChannel => write!(f, "alert channel"),
            Category::CloudAccount => write!(f, "cloud account"),
            Category::ContainerRegistry => write!(f, "container registry"),
        }
    }
}

/// Integration type tag (`TYPE` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationType {
    // Alert channels
    SlackChannel,
    Webhook,
    EmailUser,
    PagerDutyApi,
    MicrosoftTeams,
    Datadog,
    SplunkHec,
    CloudwatchEb,
    VictorOps,
    CiscoSparkWebhook,
    NewRelicInsights,
    ServiceNowRest,

    // Cloud accounts
    AwsCfg,
    AwsCtSqs,
    AzureCfg,
    AzureAlSeq,
    GcpCfg,
    GcpAtSes,

    // Container registries
    ContVulnCfg,
}

impl IntegrationType {
    /// Wire representation of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationType::SlackChannel => "SLACK_CHANNEL",
            IntegrationType::Webhook => "WEBHOOK",
            IntegrationType::EmailUser => "EMAIL_USER",
            IntegrationType::PagerDutyApi => "PAGER_DUTY_API",
            IntegrationType::MicrosoftTeams => "MICROSOFT_TEAMS",
            IntegrationType::Datadog => "DATADOG",
            IntegrationType::SplunkHec => "SPLUNK_HEC",
            IntegrationType::CloudwatchEb => "CLOUDWATCH_EB",
            IntegrationType::VictorOps => "VICTOR_OPS",
            IntegrationType::CiscoSparkWebhook => "CISCO_SPARK_WEBHOOK",
            IntegrationType::NewRelicInsights => "NEW_RELIC_INSIGHTS",
            IntegrationType::ServiceNowRest => "SERVICE_NOW_REST",
            IntegrationType::AwsCfg => "AWS_CFG",
            IntegrationType::AwsCtSqs => "AWS_CT_SQS",
            IntegrationType::AzureCfg => "AZURE_CFG",
            IntegrationType::AzureAlSeq => "AZURE_AL_SEQ",
            IntegrationType::GcpCfg => "GCP_CFG",
            IntegrationType::GcpAtSes => "GCP_AT_SES",
            IntegrationType::ContVulnCfg => "CONT_VULN_CFG",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            IntegrationType::AwsCfg
            | IntegrationType::AwsCtSqs
            | IntegrationType::AzureCfg
            | IntegrationType::AzureAlSeq
            | IntegrationType::GcpCfg
            | IntegrationType::GcpAtSes => Category::CloudAccount,
            IntegrationType::ContVulnCfg => Category::ContainerRegistry,
            _ => Category::AlertChannel,
        }
    }
}

impl std::fmt::Display for IntegrationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health reported by Lacework for an integration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationState {
    pub ok: bool,
    #[serde(default)]
    pub last_updated_time: String,
    #[serde(default)]
    pub last_successful_time: String,
}

/// A single integration record
///
/// `D` is the type-specific `DATA` payload. The untyped form
/// (`serde_json::Value`) is what the HTTP client sends and receives;
/// resource kinds convert it to and from their own payload structs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration<D = serde_json::Value> {
    #[serde(rename = "INTG_GUID", default, skip_serializing_if = "String::is_empty")]
    pub guid: String,

    #[serde(rename = "NAME")]
    pub name: String,

    #[serde(rename = "TYPE")]
    pub integration_type: IntegrationType,

    #[serde(rename = "ENABLED", with = "flag", default)]
    pub enabled: bool,

    #[serde(
        rename = "IS_ORG",
        with = "flag",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_org: bool,

    #[serde(rename = "TYPE_NAME", default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,

    #[serde(
        rename = "CREATED_OR_UPDATED_TIME",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub created_or_updated_time: String,

    #[serde(
        rename = "CREATED_OR_UPDATED_BY",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub created_or_updated_by: String,

    #[serde(rename = "STATE", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<IntegrationState>,

    #[serde(rename = "DATA")]
    pub data: D,
}

impl<D> Integration<D> {
    /// Build a request record; server-assigned fields stay empty.
    pub fn new(name: impl Into<String>, integration_type: IntegrationType, data: D) -> Self {
        Self {
            guid: String::new(),
            name: name.into(),
            integration_type,
            enabled: true,
            is_org: false,
            type_name: String::new(),
            created_or_updated_time: String::new(),
            created_or_updated_by: String::new(),
            state: None,
            data,
        }
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = guid.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Swap the payload, keeping every other field.
    pub fn map_data<T>(self, f: impl FnOnce(D) -> T) -> Integration<T> {
        Integration {
            guid: self.guid,
            name: self.name,
            integration_type: self.integration_type,
            enabled: self.enabled,
            is_org: self.is_org,
            type_name: self.type_name,
            created_or_updated_time: self.created_or_updated_time,
            created_or_updated_by: self.created_or_updated_by,
            state: self.state,
            data: f(self.data),
        }
    }
}

/// Response envelope shared by every integrations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

pub type IntegrationsResponse = ApiResponse<Integration>;

/// `0`/`1` integers on the wire, `bool` in Rust.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Bool(bool),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => n != 0,
            Raw::Bool(b) => b,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_integration_record() {
        let raw = json!({
            "INTG_GUID": "TECHALLY_1234",
            "NAME": "ops-slack",
            "TYPE": "SLACK_CHANNEL",
            "TYPE_NAME": "Slack Channel",
            "ENABLED": 1,
            "IS_ORG": 0,
            "CREATED_OR_UPDATED_TIME": "2024-01-05T10:00:00.000Z",
            "CREATED_OR_UPDATED_BY": "ops@example.com",
            "STATE": {"ok": true, "lastUpdatedTime": "1704448800000"},
            "DATA": {"SLACK_URL": "https://hooks.slack.com/services/T000/B000/XXX"}
        });

        let record: Integration = serde_json::from_value(raw).unwrap();
        assert_eq!(record.guid, "TECHALLY_1234");
        assert_eq!(record.integration_type, IntegrationType::SlackChannel);
        assert!(record.enabled);
        assert!(!record.is_org);
        assert_eq!(record.created_or_updated_by, "ops@example.com");
        assert!(record.state.as_ref().unwrap().ok);
        assert_eq!(
            record.data["SLACK_URL"],
            "https://hooks.slack.com/services/T000/B000/XXX"
        );
    }

    #[test]
    fn test_request_omits_server_fields() {
        let request = Integration::new(
            "ops-webhook",
            IntegrationType::Webhook,
            json!({"WEBHOOK_URL": "https://example.com/hook"}),
        )
        .with_enabled(false);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["ENABLED"], 0);
        assert_eq!(value["TYPE"], "WEBHOOK");
        assert!(value.get("INTG_GUID").is_none());
        assert!(value.get("IS_ORG").is_none());
        assert!(value.get("STATE").is_none());
    }

    #[test]
    fn test_enabled_accepts_booleans() {
        let record: Integration = serde_json::from_value(json!({
            "NAME": "x",
            "TYPE": "WEBHOOK",
            "ENABLED": true,
            "DATA": {}
        }))
        .unwrap();
        assert!(record.enabled);
    }

    #[test]
    fn test_envelope_without_data() {
        let response: IntegrationsResponse =
            serde_json::from_value(json!({"ok": true, "message": "SUCCESS"})).unwrap();
        assert!(response.ok);
        assert!(response.data.is_empty());
    }

    fn parse_envelope<T: serde::de::DeserializeOwned>(raw: serde_json::Value) -> ApiResponse<T> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_envelope_payload_needs_no_default() {
        #[derive(Debug, Deserialize)]
        struct Token {
            token: String,
        }

        let response: ApiResponse<Token> =
            parse_envelope(json!({"ok": true, "data": [{"token": "abc"}]}));
        assert_eq!(response.data[0].token, "abc");

        let empty: ApiResponse<Token> = parse_envelope(json!({"ok": false}));
        assert!(empty.data.is_empty());
    }

    #[test]
    fn test_as_str_matches_serde() {
        for t in [
            IntegrationType::PagerDutyApi,
            IntegrationType::AwsCtSqs,
            IntegrationType::ContVulnCfg,
            IntegrationType::CiscoSparkWebhook,
        ] {
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
        }
    }

    #[test]
    fn test_category() {
        assert_eq!(IntegrationType::Datadog.category(), Category::AlertChannel);
        assert_eq!(IntegrationType::GcpAtSes.category(), Category::CloudAccount);
        assert_eq!(
            IntegrationType::ContVulnCfg.category(),
            Category::ContainerRegistry
        );
    }
}
