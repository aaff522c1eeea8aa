//! Alert channels
//!
//! Every channel is tested after create/update unless `test_integration`
//! is turned off.

use super::keep_secret;
use crate::error::Result;
use crate::resource::IntegrationKind;
use crate::schema::Validator;
use lacework_api::IntegrationType;
use serde::{Deserialize, Serialize};

// Slack

pub struct Slack;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackSettings {
    pub slack_url: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SlackData {
    pub slack_url: String,
}

impl IntegrationKind for Slack {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_slack";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::SlackChannel;
    const VERIFY: bool = true;
    type Settings = SlackSettings;
    type Data = SlackData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.url("slack_url", &settings.slack_url);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        SlackData {
            slack_url: settings.slack_url.clone(),
        }
    }

    fn from_data(data: Self::Data, _prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(SlackSettings {
            slack_url: data.slack_url,
        })
    }
}

// Webhook

pub struct Webhook;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookSettings {
    pub webhook_url: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WebhookData {
    pub webhook_url: String,
}

impl IntegrationKind for Webhook {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_webhook";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::Webhook;
    const VERIFY: bool = true;
    type Settings = WebhookSettings;
    type Data = WebhookData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.url("webhook_url", &settings.webhook_url);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        WebhookData {
            webhook_url: settings.webhook_url.clone(),
        }
    }

    fn from_data(data: Self::Data, _prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(WebhookSettings {
            webhook_url: data.webhook_url,
        })
    }
}

// Email

pub struct Email;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSettings {
    pub recipients: Vec<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EmailData {
    pub channel_props: EmailProps,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailProps {
    pub recipients: Vec<String>,
}

impl IntegrationKind for Email {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_email";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::EmailUser;
    const VERIFY: bool = true;
    type Settings = EmailSettings;
    type Data = EmailData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.check(
            !settings.recipients.is_empty(),
            "'recipients' must list at least one address",
        );
        for recipient in &settings.recipients {
            v.check(
                recipient.contains('@'),
                format!("'{}' is not an email address", recipient),
            );
        }
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        EmailData {
            channel_props: EmailProps {
                recipients: settings.recipients.clone(),
            },
        }
    }

    fn from_data(data: Self::Data, _prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(EmailSettings {
            recipients: data.channel_props.recipients,
        })
    }
}

// PagerDuty

pub struct PagerDuty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagerDutySettings {
    pub integration_key: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PagerDutyData {
    pub api_intg_key: String,
}

impl IntegrationKind for PagerDuty {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_pagerduty";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::PagerDutyApi;
    const VERIFY: bool = true;
    type Settings = PagerDutySettings;
    type Data = PagerDutyData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.required("integration_key", &settings.integration_key);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        PagerDutyData {
            api_intg_key: settings.integration_key.clone(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(PagerDutySettings {
            integration_key: keep_secret(data.api_intg_key, prior.map(|p| &p.integration_key)),
        })
    }
}

// Microsoft Teams

pub struct MicrosoftTeams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrosoftTeamsSettings {
    pub webhook_url: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MicrosoftTeamsData {
    pub teams_url: String,
}

impl IntegrationKind for MicrosoftTeams {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_microsoft_teams";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::MicrosoftTeams;
    const VERIFY: bool = true;
    type Settings = MicrosoftTeamsSettings;
    type Data = MicrosoftTeamsData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.url("webhook_url", &settings.webhook_url);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        MicrosoftTeamsData {
            teams_url: settings.webhook_url.clone(),
        }
    }

    fn from_data(data: Self::Data, _prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(MicrosoftTeamsSettings {
            webhook_url: data.teams_url,
        })
    }
}

// Datadog

pub struct Datadog;

const DATADOG_SITES: &[&str] = &["com", "eu"];
const DATADOG_SERVICES: &[&str] = &["Logs Detail", "Logs Summary", "Events Summary"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatadogSettings {
    pub api_key: String,
    #[serde(default = "default_datadog_site")]
    pub datadog_site: String,
    #[serde(default = "default_datadog_service")]
    pub datadog_service: String,
}

fn default_datadog_site() -> String {
    "com".to_string()
}

fn default_datadog_service() -> String {
    "Logs Summary".to_string()
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DatadogData {
    pub datadog_type: String,
    pub datadog_site: String,
    pub api_key: String,
}

impl IntegrationKind for Datadog {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_datadog";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::Datadog;
    const VERIFY: bool = true;
    type Settings = DatadogSettings;
    type Data = DatadogData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.required("api_key", &settings.api_key)
            .one_of("datadog_site", &settings.datadog_site, DATADOG_SITES)
            .one_of(
                "datadog_service",
                &settings.datadog_service,
                DATADOG_SERVICES,
            );
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        DatadogData {
            datadog_type: settings.datadog_service.clone(),
            datadog_site: settings.datadog_site.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(DatadogSettings {
            api_key: keep_secret(data.api_key, prior.map(|p| &p.api_key)),
            datadog_site: data.datadog_site,
            datadog_service: data.datadog_type,
        })
    }
}

// Splunk

pub struct Splunk;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplunkSettings {
    pub channel: String,
    pub hec_token: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub ssl: bool,
    pub event_data: SplunkEventData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplunkEventData {
    pub index: String,
    pub source: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SplunkData {
    pub channel: String,
    pub hec_token: String,
    pub host: String,
    pub port: u16,
    pub ssl: bool,
    pub event_data: SplunkEventPayload,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SplunkEventPayload {
    pub index: String,
    pub source: String,
}

impl IntegrationKind for Splunk {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_splunk";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::SplunkHec;
    const VERIFY: bool = true;
    type Settings = SplunkSettings;
    type Data = SplunkData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.required("channel", &settings.channel)
            .required("hec_token", &settings.hec_token)
            .required("host", &settings.host)
            .required("event_data.index", &settings.event_data.index)
            .required("event_data.source", &settings.event_data.source)
            .check(settings.port != 0, "'port' must not be 0");
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        SplunkData {
            channel: settings.channel.clone(),
            hec_token: settings.hec_token.clone(),
            host: settings.host.clone(),
            port: settings.port,
            ssl: settings.ssl,
            event_data: SplunkEventPayload {
                index: settings.event_data.index.clone(),
                source: settings.event_data.source.clone(),
            },
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(SplunkSettings {
            channel: data.channel,
            hec_token: keep_secret(data.hec_token, prior.map(|p| &p.hec_token)),
            host: data.host,
            port: data.port,
            ssl: data.ssl,
            event_data: SplunkEventData {
                index: data.event_data.index,
                source: data.event_data.source,
            },
        })
    }
}

// AWS CloudWatch

pub struct AwsCloudWatch;

const ISSUE_GROUPINGS: &[&str] = &["Events", "Resources"];

fn default_issue_grouping() -> String {
    "Events".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsCloudWatchSettings {
    pub event_bus_arn: String,
    #[serde(default = "default_issue_grouping")]
    pub group_issues_by: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AwsCloudWatchData {
    pub event_bus_arn: String,
    #[serde(default = "default_issue_grouping")]
    pub issue_grouping: String,
}

impl IntegrationKind for AwsCloudWatch {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_aws_cloudwatch";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::CloudwatchEb;
    const VERIFY: bool = true;
    type Settings = AwsCloudWatchSettings;
    type Data = AwsCloudWatchData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.check(
            settings.event_bus_arn.starts_with("arn:"),
            format!(
                "'event_bus_arn' must be an ARN, got '{}'",
                settings.event_bus_arn
            ),
        )
        .one_of("group_issues_by", &settings.group_issues_by, ISSUE_GROUPINGS);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        AwsCloudWatchData {
            event_bus_arn: settings.event_bus_arn.clone(),
            issue_grouping: settings.group_issues_by.clone(),
        }
    }

    fn from_data(data: Self::Data, _prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(AwsCloudWatchSettings {
            event_bus_arn: data.event_bus_arn,
            group_issues_by: data.issue_grouping,
        })
    }
}

// VictorOps

pub struct VictorOps;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VictorOpsSettings {
    pub webhook_url: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct VictorOpsData {
    pub intg_url: String,
}

impl IntegrationKind for VictorOps {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_victorops";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::VictorOps;
    const VERIFY: bool = true;
    type Settings = VictorOpsSettings;
    type Data = VictorOpsData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.url("webhook_url", &settings.webhook_url);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        VictorOpsData {
            intg_url: settings.webhook_url.clone(),
        }
    }

    fn from_data(data: Self::Data, _prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(VictorOpsSettings {
            webhook_url: data.intg_url,
        })
    }
}

// Cisco Webex

pub struct CiscoWebex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CiscoWebexSettings {
    pub webhook_url: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CiscoWebexData {
    pub webhook: String,
}

impl IntegrationKind for CiscoWebex {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_cisco_webex";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::CiscoSparkWebhook;
    const VERIFY: bool = true;
    type Settings = CiscoWebexSettings;
    type Data = CiscoWebexData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.url("webhook_url", &settings.webhook_url);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        CiscoWebexData {
            webhook: settings.webhook_url.clone(),
        }
    }

    fn from_data(data: Self::Data, _prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(CiscoWebexSettings {
            webhook_url: data.webhook,
        })
    }
}

// New Relic Insights

pub struct NewRelic;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRelicSettings {
    pub account_id: u64,
    pub insert_key: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NewRelicData {
    pub account_id: u64,
    pub insert_key: String,
}

impl IntegrationKind for NewRelic {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_newrelic";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::NewRelicInsights;
    const VERIFY: bool = true;
    type Settings = NewRelicSettings;
    type Data = NewRelicData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.check(settings.account_id != 0, "'account_id' must not be 0")
            .required("insert_key", &settings.insert_key);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        NewRelicData {
            account_id: settings.account_id,
            insert_key: settings.insert_key.clone(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(NewRelicSettings {
            account_id: data.account_id,
            insert_key: keep_secret(data.insert_key, prior.map(|p| &p.insert_key)),
        })
    }
}

// ServiceNow

pub struct ServiceNow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceNowSettings {
    pub instance_url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_issue_grouping")]
    pub issue_grouping: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ServiceNowData {
    pub instance_url: String,
    pub user_name: String,
    pub password: String,
    #[serde(default = "default_issue_grouping")]
    pub issue_grouping: String,
}

impl IntegrationKind for ServiceNow {
    const RESOURCE_TYPE: &'static str = "lacework_alert_channel_service_now";
    const INTEGRATION_TYPE: IntegrationType = IntegrationType::ServiceNowRest;
    const VERIFY: bool = true;
    type Settings = ServiceNowSettings;
    type Data = ServiceNowData;

    fn validate(settings: &Self::Settings, v: &mut Validator) {
        v.url("instance_url", &settings.instance_url)
            .required("username", &settings.username)
            .required("password", &settings.password)
            .one_of("issue_grouping", &settings.issue_grouping, ISSUE_GROUPINGS);
    }

    fn to_data(settings: &Self::Settings) -> Self::Data {
        ServiceNowData {
            instance_url: settings.instance_url.clone(),
            user_name: settings.username.clone(),
            password: settings.password.clone(),
            issue_grouping: settings.issue_grouping.clone(),
        }
    }

    fn from_data(data: Self::Data, prior: Option<&Self::Settings>) -> Result<Self::Settings> {
        Ok(ServiceNowSettings {
            instance_url: data.instance_url,
            username: data.user_name,
            password: keep_secret(data.password, prior.map(|p| &p.password)),
            issue_grouping: data.issue_grouping,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::IntegrationResource;
    use crate::resource::Resource;
    use serde_json::json;

    #[test]
    fn test_slack_rejects_bad_url() {
        let err = IntegrationResource::<Slack>::new()
            .validate(&json!({"name": "ops", "slack_url": "hooks.slack.com"}))
            .unwrap_err();
        assert!(err.to_string().contains("slack_url"));
    }

    #[test]
    fn test_email_payload_shape() {
        let resource = IntegrationResource::<Email>::new();
        let config = resource
            .parse_config(&json!({"name": "mail", "recipients": ["a@example.com"]}))
            .unwrap();
        let data = serde_json::to_value(Email::to_data(&config.settings)).unwrap();
        assert_eq!(
            data,
            json!({"CHANNEL_PROPS": {"recipients": ["a@example.com"]}})
        );
    }

    #[test]
    fn test_datadog_defaults() {
        let config = IntegrationResource::<Datadog>::new()
            .parse_config(&json!({"name": "dd", "api_key": "secret"}))
            .unwrap();
        assert_eq!(config.settings.datadog_site, "com");
        assert_eq!(config.settings.datadog_service, "Logs Summary");

        let err = IntegrationResource::<Datadog>::new()
            .validate(&json!({"name": "dd", "api_key": "k", "datadog_site": "jp"}))
            .unwrap_err();
        assert!(err.to_string().contains("datadog_site"));
    }

    #[test]
    fn test_splunk_payload_shape() {
        let resource = IntegrationResource::<Splunk>::new();
        let config = resource
            .parse_config(&json!({
                "name": "splunk",
                "channel": "channel-name",
                "hec_token": "token",
                "host": "splunk.example.com",
                "port": 8088,
                "ssl": true,
                "event_data": {"index": "main", "source": "lacework"}
            }))
            .unwrap();
        let data = serde_json::to_value(Splunk::to_data(&config.settings)).unwrap();
        assert_eq!(data["HEC_TOKEN"], "token");
        assert_eq!(data["PORT"], 8088);
        assert_eq!(data["EVENT_DATA"]["INDEX"], "main");
    }

    #[test]
    fn test_secret_kept_from_prior() {
        let prior = PagerDutySettings {
            integration_key: "real-key".to_string(),
        };
        let settings = PagerDuty::from_data(
            PagerDutyData {
                api_intg_key: "****".to_string(),
            },
            Some(&prior),
        )
        .unwrap();
        assert_eq!(settings.integration_key, "real-key");

        let imported = PagerDuty::from_data(
            PagerDutyData {
                api_intg_key: "****".to_string(),
            },
            None,
        )
        .unwrap();
        assert_eq!(imported.integration_key, "****");
    }

    #[test]
    fn test_service_now_grouping() {
        let err = IntegrationResource::<ServiceNow>::new()
            .validate(&json!({
                "name": "snow",
                "instance_url": "https://dev.service-now.com",
                "username": "admin",
                "password": "pw",
                "issue_grouping": "Hosts"
            }))
            .unwrap_err();
        assert!(err.to_string().contains("issue_grouping"));
    }
}
