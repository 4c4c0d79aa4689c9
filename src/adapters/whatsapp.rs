use crate::adapters::http::{describe_failure, join_url};
use crate::config::{resolved, WhatsAppConfig};
use crate::domain::model::DeliveryOutcome;
use crate::domain::ports::Notifier;
use crate::utils::error::{CrmError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Sends the configured template through the WhatsApp Cloud API.
#[derive(Debug, Clone)]
pub struct WhatsAppNotifier {
    config: WhatsAppConfig,
    client: Client,
}

impl WhatsAppNotifier {
    pub fn new(config: WhatsAppConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Template payload. The lead's name goes in as the single body
    /// parameter only when `name_parameter` is set.
    pub fn template_payload(&self, name: &str, phone: &str) -> Value {
        let mut template = json!({
            "name": self.config.template_name,
            "language": { "code": self.config.language_code },
        });
        if self.config.name_parameter {
            template["components"] = json!([{
                "type": "body",
                "parameters": [{ "type": "text", "text": name }]
            }]);
        }

        json!({
            "messaging_product": "whatsapp",
            "to": format!("{}{}", self.config.country_code, phone),
            "type": "template",
            "template": template,
        })
    }

    async fn try_send(&self, token: &str, phone_number_id: &str, name: &str, phone: &str) -> Result<()> {
        let url = join_url(
            &self.config.api_base,
            &[self.config.api_version.as_str(), phone_number_id, "messages"],
        )?;

        tracing::debug!("Sending WhatsApp template '{}' to {}", self.config.template_name, phone);
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&self.template_payload(name, phone))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CrmError::NotificationFailure {
                message: describe_failure("WhatsApp API", response).await,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    async fn notify(&self, name: &str, phone: &str) -> DeliveryOutcome {
        if !self.config.enabled {
            return DeliveryOutcome::skipped("WhatsApp notifications disabled");
        }

        let (Some(token), Some(phone_number_id)) = (
            resolved(&self.config.access_token),
            resolved(&self.config.phone_number_id),
        ) else {
            return DeliveryOutcome::skipped("WhatsApp ENV missing");
        };

        self.try_send(token, phone_number_id, name, phone).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn notifier(server: &MockServer, token: Option<&str>) -> WhatsAppNotifier {
        let config = WhatsAppConfig {
            access_token: token.map(str::to_string),
            phone_number_id: Some("1098765".to_string()),
            template_name: "lead_welcome".to_string(),
            name_parameter: true,
            language_code: "en".to_string(),
            api_base: server.base_url(),
            ..WhatsAppConfig::default()
        };
        let client = crate::adapters::http::build_client(Duration::from_secs(5)).unwrap();
        WhatsAppNotifier::new(config, client)
    }

    #[tokio::test]
    async fn test_sends_template_message() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v19.0/1098765/messages")
                .header("authorization", "Bearer wa-token")
                .json_body(serde_json::json!({
                    "messaging_product": "whatsapp",
                    "to": "919876543210",
                    "type": "template",
                    "template": {
                        "name": "lead_welcome",
                        "language": { "code": "en" },
                        "components": [{
                            "type": "body",
                            "parameters": [{ "type": "text", "text": "Asha" }]
                        }]
                    }
                }));
            then.status(200)
                .json_body(serde_json::json!({"messages": [{"id": "wamid.X"}]}));
        });

        let outcome = notifier(&server, Some("wa-token"))
            .notify("Asha", "9876543210")
            .await;

        api_mock.assert();
        assert_eq!(outcome, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_default_template_sends_no_components() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v19.0/1098765/messages")
                .json_body(serde_json::json!({
                    "messaging_product": "whatsapp",
                    "to": "919876543210",
                    "type": "template",
                    "template": {
                        "name": "hello_world",
                        "language": { "code": "en_US" }
                    }
                }));
            then.status(200)
                .json_body(serde_json::json!({"messages": [{"id": "wamid.Y"}]}));
        });

        let config = WhatsAppConfig {
            access_token: Some("wa-token".to_string()),
            phone_number_id: Some("1098765".to_string()),
            api_base: server.base_url(),
            ..WhatsAppConfig::default()
        };
        let client = crate::adapters::http::build_client(Duration::from_secs(5)).unwrap();
        let notifier = WhatsAppNotifier::new(config, client);

        let payload = notifier.template_payload("Asha", "9876543210");
        assert!(payload["template"].get("components").is_none());

        let outcome = notifier.notify("Asha", "9876543210").await;
        api_mock.assert();
        assert_eq!(outcome, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_missing_token_is_skipped() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.path_contains("/messages");
            then.status(200);
        });

        let outcome = notifier(&server, None).notify("Asha", "9876543210").await;

        api_mock.assert_hits(0);
        assert!(matches!(outcome, DeliveryOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_api_error_is_failed_outcome() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v19.0/1098765/messages");
            then.status(401)
                .json_body(serde_json::json!({"error": {"message": "Invalid OAuth access token"}}));
        });

        let outcome = notifier(&server, Some("expired")).notify("Asha", "9876543210").await;

        match outcome {
            DeliveryOutcome::Failed { error } => {
                assert!(error.contains("401"));
                assert!(error.contains("Invalid OAuth access token"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_api_is_failed_outcome() {
        let config = WhatsAppConfig {
            access_token: Some("wa-token".to_string()),
            phone_number_id: Some("1098765".to_string()),
            // 沒有服務在聽的埠
            api_base: "http://127.0.0.1:9".to_string(),
            ..WhatsAppConfig::default()
        };
        let client = crate::adapters::http::build_client(Duration::from_secs(2)).unwrap();
        let outcome = WhatsAppNotifier::new(config, client)
            .notify("Asha", "9876543210")
            .await;
        assert!(matches!(outcome, DeliveryOutcome::Failed { .. }));
    }
}
