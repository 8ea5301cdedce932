use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

use super::payload::SlackMessage;
use super::{ChannelSettings, NotificationSink};
use crate::error::Result;
use crate::model::Notification;

/// Writes the chat payloads that would have been posted, one JSON document
/// per target channel. Used for dry runs.
pub struct StdoutSink<W: Write + Send = std::io::Stdout> {
    settings: ChannelSettings,
    pretty: bool,
    out: Mutex<W>,
}

impl StdoutSink {
    pub fn new(settings: ChannelSettings, pretty: bool) -> Self {
        Self::with_writer(settings, pretty, std::io::stdout())
    }
}

impl<W: Write + Send> StdoutSink<W> {
    pub fn with_writer(settings: ChannelSettings, pretty: bool, out: W) -> Self {
        Self {
            settings,
            pretty,
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl<W: Write + Send> NotificationSink for StdoutSink<W> {
    async fn deliver(&self, notification: &Notification, important: bool) -> Result<()> {
        let mut rendered = Vec::new();
        for channel in self.settings.targets(important) {
            let message = SlackMessage::render(notification, channel, &self.settings);
            rendered.push(if self.pretty {
                serde_json::to_string_pretty(&message)?
            } else {
                serde_json::to_string(&message)?
            });
        }

        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for line in rendered {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        Ok(())
    }
}
