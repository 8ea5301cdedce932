use log::{debug, error, info, warn};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::{analyze_history, extract_failure};
use crate::compose::{is_escalation, NotificationComposer};
use crate::error::{CINotifyError, Result};
use crate::event;
use crate::model::{CommitInfo, EnrichmentRecord, ExecutionInfo, Notification, PipelineEvent};
use crate::model::{StageErrorInfo, Summary};
use crate::providers::{
    ActionFailureProvider, CommitInfoProvider, ExecutionInfoProvider, RunHistoryProvider,
};
use crate::sinks::NotificationSink;

/// Upstream collaborators used to hydrate an event.
#[derive(Clone)]
pub struct Providers {
    pub execution: Arc<dyn ExecutionInfoProvider>,
    pub history: Arc<dyn RunHistoryProvider>,
    pub actions: Arc<dyn ActionFailureProvider>,
    pub commits: Arc<dyn CommitInfoProvider>,
}

/// What happened to one inbound event.
#[derive(Debug)]
pub enum Outcome {
    /// Not a usable pipeline event; nothing was looked up.
    Dropped(CINotifyError),
    /// Execution detail could not be loaded; nothing was sent.
    Aborted(CINotifyError),
    Delivered {
        notification: Notification,
        important: bool,
    },
    DeliveryFailed {
        notification: Notification,
        important: bool,
        error: CINotifyError,
    },
}

/// Turns raw pipeline events into delivered notifications.
///
/// Each call owns its own enrichment record; nothing is shared between
/// events, so one bad event never affects another.
pub struct Enricher {
    providers: Providers,
    sink: Arc<dyn NotificationSink>,
    composer: NotificationComposer,
    timeout: Duration,
}

impl Enricher {
    pub fn new(
        providers: Providers,
        sink: Arc<dyn NotificationSink>,
        composer: NotificationComposer,
        timeout: Duration,
    ) -> Self {
        Self {
            providers,
            sink,
            composer,
            timeout,
        }
    }

    /// Processes one event and logs the outcome. Never fails; every error is
    /// folded into the returned [`Outcome`].
    pub async fn handle(&self, raw: &Value) -> Outcome {
        let outcome = self.process(raw).await;
        match &outcome {
            Outcome::Dropped(_) | Outcome::Aborted(_) => {}
            Outcome::Delivered { important, .. } => {
                debug!("Notification delivered (important: {important})");
            }
            Outcome::DeliveryFailed { error, .. } => {
                error!("Failed to deliver notification: {error}");
            }
        }
        outcome
    }

    /// Processes one event and reports what happened.
    ///
    /// Only a failure to load execution detail stops the notification; every
    /// other enrichment step degrades to an absent field.
    pub async fn process(&self, raw: &Value) -> Outcome {
        let event = match event::normalize(raw) {
            Ok(event) => event,
            Err(e) => {
                if event::handles(raw) {
                    warn!("Dropping malformed pipeline event: {e}");
                } else {
                    info!("Ignoring unrelated event: {e}");
                }
                return Outcome::Dropped(e);
            }
        };

        info!(
            "Handling {} execution {} ({})",
            event.pipeline_name, event.execution_id, event.state
        );

        let record = match self.enrich(event).await {
            Ok(record) => record,
            Err((event, e)) => {
                error!(
                    "[{}/{}] execution-info failed, no notification sent: {e}",
                    event.pipeline_name, event.execution_id
                );
                return Outcome::Aborted(e);
            }
        };

        let notification = self.composer.compose(&record);
        let important = is_escalation(record.summary.as_ref());

        match self.sink.deliver(&notification, important).await {
            Ok(()) => Outcome::Delivered {
                notification,
                important,
            },
            Err(error) => {
                error!(
                    "[{}/{}] delivery failed: {error}",
                    record.event.pipeline_name, record.event.execution_id
                );
                Outcome::DeliveryFailed {
                    notification,
                    important,
                    error,
                }
            }
        }
    }

    /// Hydrates an event into an enrichment record.
    ///
    /// Execution detail is loaded first; run history, the action state tree
    /// and commit metadata are then fetched concurrently.
    ///
    /// # Errors
    ///
    /// Returns the event back with the error if execution detail cannot be
    /// loaded.
    pub async fn enrich(
        &self,
        event: PipelineEvent,
    ) -> std::result::Result<EnrichmentRecord, (PipelineEvent, CINotifyError)> {
        let execution_info = match self
            .with_timeout(
                "execution-info",
                self.providers
                    .execution
                    .get_execution(&event.pipeline_name, &event.execution_id),
            )
            .await
        {
            Ok(info) => info,
            Err(e) => return Err((event, e)),
        };

        let (summary, stage_error, commit) = tokio::join!(
            self.summarize(&event, &execution_info),
            self.find_failure(&event),
            self.lookup_commit(&event, &execution_info),
        );

        Ok(EnrichmentRecord {
            event,
            execution_info,
            summary,
            stage_error,
            commit,
        })
    }

    async fn summarize(&self, event: &PipelineEvent, info: &ExecutionInfo) -> Option<Summary> {
        let history = self
            .with_timeout(
                "run-history",
                self.providers.history.list_executions(&event.pipeline_name),
            )
            .await
            .map_err(|e| {
                warn!(
                    "[{}/{}] run-history failed, continuing without summary: {e}",
                    event.pipeline_name, event.execution_id
                );
            })
            .ok()?;

        let summary = analyze_history(&info.execution_id, &history);
        if summary.is_none() {
            info!("No run history loaded for {}", event.pipeline_name);
        }
        summary
    }

    async fn find_failure(&self, event: &PipelineEvent) -> Option<StageErrorInfo> {
        let stages = self
            .with_timeout(
                "action-state",
                self.providers.actions.get_state(&event.pipeline_name),
            )
            .await
            .map_err(|e| {
                warn!(
                    "[{}/{}] action-state failed, continuing without failure detail: {e}",
                    event.pipeline_name, event.execution_id
                );
            })
            .ok()?;

        extract_failure(&stages)
    }

    async fn lookup_commit(&self, event: &PipelineEvent, info: &ExecutionInfo) -> Option<CommitInfo> {
        let Some(revision_url) = info
            .latest_revision()
            .and_then(|r| r.revision_url.as_deref())
        else {
            info!("No commit information available, skipping.");
            return None;
        };

        debug!("Loading commit info for {revision_url}");

        match self
            .with_timeout("commit-info", self.providers.commits.resolve(revision_url))
            .await
        {
            Ok(commit) => Some(commit),
            Err(e) => {
                warn!(
                    "[{}/{}] commit-info failed, commit info will be unavailable: {e}",
                    event.pipeline_name, event.execution_id
                );
                None
            }
        }
    }

    async fn with_timeout<T>(
        &self,
        operation: &str,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.timeout, future)
            .await
            .map_err(|_| CINotifyError::Timeout {
                operation: operation.to_string(),
                seconds: self.timeout.as_secs(),
            })?
    }
}
