//! Delivery of composed notifications.

mod payload;
mod slack;
mod stdout;

use async_trait::async_trait;
use log::info;

use crate::error::Result;
use crate::model::Notification;

pub use slack::SlackSink;
pub use stdout::StdoutSink;

/// Delivers notifications to the primary channel, and additionally to a
/// secondary channel when `important` is set and one is configured.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification, important: bool) -> Result<()>;
}

/// Channel identity shared by the chat sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings {
    pub channel: String,
    pub channel_important: Option<String>,
    pub username: Option<String>,
    pub icon_emoji: Option<String>,
}

impl ChannelSettings {
    /// Channels a notification goes to, primary first.
    pub fn targets(&self, important: bool) -> Vec<&str> {
        let mut targets = vec![self.channel.as_str()];
        if important {
            match self.channel_important.as_deref() {
                Some(channel) => targets.push(channel),
                None => {
                    info!("No important channel configured, will not send additional message");
                }
            }
        }
        targets
    }
}
