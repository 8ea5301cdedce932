use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::payload::SlackMessage;
use super::{ChannelSettings, NotificationSink};
use crate::config::SlackConfig;
use crate::error::{CINotifyError, Result};
use crate::model::Notification;

/// Posts notifications to a chat incoming webhook.
pub struct SlackSink {
    client: Client,
    webhook_url: Url,
    settings: ChannelSettings,
}

impl SlackSink {
    pub fn new(webhook_url: &str, settings: ChannelSettings, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CINotifyError::Config(format!("Failed to create HTTP client: {e}")))?;

        let webhook_url = Url::parse(webhook_url)
            .map_err(|e| CINotifyError::Config(format!("Invalid webhook URL: {e}")))?;

        Ok(Self {
            client,
            webhook_url,
            settings,
        })
    }

    /// # Errors
    ///
    /// Returns [`CINotifyError::Config`] if the webhook URL or primary channel
    /// is missing.
    pub fn from_config(config: &SlackConfig, timeout: Duration) -> Result<Self> {
        let webhook_url = config
            .webhook_url
            .as_deref()
            .ok_or_else(|| CINotifyError::Config("missing slack webhook URL".to_string()))?;
        let channel = config
            .channel
            .clone()
            .ok_or_else(|| CINotifyError::Config("missing slack channel".to_string()))?;

        let settings = ChannelSettings {
            channel,
            channel_important: config.channel_important.clone(),
            username: config.username.clone(),
            icon_emoji: config.icon_emoji.clone(),
        };

        Self::new(webhook_url, settings, timeout)
    }

    async fn post(&self, message: &SlackMessage) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(CINotifyError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationSink for SlackSink {
    async fn deliver(&self, notification: &Notification, important: bool) -> Result<()> {
        let mut first_error = None;

        for (i, channel) in self.settings.targets(important).into_iter().enumerate() {
            if i == 0 {
                info!(
                    "Sending message \"{}\" to channel \"{channel}\"",
                    notification.heading
                );
            } else {
                info!("Important, so also sending to channel \"{channel}\"");
            }

            let message = SlackMessage::render(notification, channel, &self.settings);
            if let Err(e) = self.post(&message).await {
                warn!("Failed to send message to channel \"{channel}\": {e}");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
