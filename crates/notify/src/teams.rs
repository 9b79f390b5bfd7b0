//! Microsoft Teams incoming-webhook sink.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use scrumwatch_core::config::NotifyConfig;

use crate::error::NotifyError;
use crate::NotificationSink;

/// Posts plain-text messages to a Teams incoming webhook.
pub struct TeamsWebhook {
    webhook_url: Option<String>,
    client: Client,
}

impl TeamsWebhook {
    #[must_use]
    pub fn new(config: &NotifyConfig) -> Self {
        let webhook_url =
            config.webhook_url.clone().filter(|url| !url.trim().is_empty());

        if webhook_url.is_none() {
            debug!("teams notifications disabled (webhook url not set)");
        }

        Self { webhook_url, client: Client::new() }
    }

    pub fn enabled(&self) -> bool {
        self.webhook_url.is_some()
    }
}

#[async_trait]
impl NotificationSink for TeamsWebhook {
    fn name(&self) -> &'static str {
        "teams"
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let Some(webhook_url) = &self.webhook_url else {
            return Err(NotifyError::NotConfigured);
        };

        let response = self.client.post(webhook_url).json(&TeamsPayload { text: message }).send().await?;

        if response.status().is_success() {
            debug!(channel = "teams", "notification sent successfully");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Status { status: status.as_u16(), body })
        }
    }
}

/// Connector-card body with only the text section set.
#[derive(Debug, Serialize)]
struct TeamsPayload<'a> {
    text: &'a str,
}
