use serde::{Deserialize, Serialize};

use super::ChannelSettings;
use crate::model::Notification;

/// Incoming-webhook message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    pub text: String,
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackAttachment {
    pub color: String,
    pub ts: i64,
    pub fields: Vec<SlackField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub mrkdwn_in: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackField {
    pub value: String,
    pub short: bool,
}

impl SlackMessage {
    pub fn render(notification: &Notification, channel: &str, settings: &ChannelSettings) -> Self {
        let fields = notification
            .fields
            .iter()
            .map(|f| SlackField {
                value: f.text.clone(),
                short: f.is_short,
            })
            .collect();

        Self {
            channel: channel.to_string(),
            username: settings.username.clone(),
            icon_emoji: settings.icon_emoji.clone(),
            text: notification.heading.clone(),
            attachments: vec![SlackAttachment {
                color: notification.color.as_str().to_string(),
                ts: notification.timestamp,
                fields,
                footer: notification.footer.clone(),
                mrkdwn_in: vec!["fields".to_string(), "footer".to_string()],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, Field};
    use serde_json::json;

    #[test]
    fn test_render_message() {
        let notification = Notification {
            heading: "*<https://console|api-deploy>*: Still *Failed*".to_string(),
            color: Color::Neutral,
            timestamp: 1_709_294_430,
            fields: vec![Field {
                text: "*Commit:* abc".to_string(),
                is_short: false,
            }],
            footer: None,
        };
        let settings = ChannelSettings {
            channel: "#builds".to_string(),
            channel_important: None,
            username: Some("pipeline-bot".to_string()),
            icon_emoji: None,
        };

        let message = SlackMessage::render(&notification, "#alerts", &settings);

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "channel": "#alerts",
                "username": "pipeline-bot",
                "text": "*<https://console|api-deploy>*: Still *Failed*",
                "attachments": [{
                    "color": "#AAAAAA",
                    "ts": 1_709_294_430,
                    "fields": [{"value": "*Commit:* abc", "short": false}],
                    "mrkdwn_in": ["fields", "footer"]
                }]
            })
        );
    }
}
