use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::ExecutionStatus;

/// A normalized pipeline-execution state-change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub time: DateTime<Utc>,
    pub pipeline_name: String,
    pub execution_id: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub revision_url: Option<String>,
    pub revision_id: Option<String>,
    pub revision_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionInfo {
    pub execution_id: String,
    pub status: ExecutionStatus,
    /// Most recent revision first.
    pub artifact_revisions: Vec<Revision>,
}

impl ExecutionInfo {
    pub fn latest_revision(&self) -> Option<&Revision> {
        self.artifact_revisions.first()
    }
}

/// One entry of a pipeline's run history. Histories are newest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHistoryEntry {
    pub execution_id: String,
    pub status: ExecutionStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub last_update_time: Option<DateTime<Utc>>,
}

/// A stage of the current pipeline state tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub stage_name: Option<String>,
    #[serde(default)]
    pub action_states: Vec<Action>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub action_name: Option<String>,
    pub latest_execution: Option<ActionExecution>,
    pub entity_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionExecution {
    pub status: Option<String>,
    pub error_details: Option<ErrorDetails>,
    pub external_execution_id: Option<String>,
    pub external_execution_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// The first failing action found in a pipeline state tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageErrorInfo {
    pub stage_name: String,
    pub action_name: String,
    pub code: String,
    pub message: String,
    pub entity_url: Option<String>,
    pub external_execution_id: Option<String>,
    pub external_execution_url: Option<String>,
}

/// Commit metadata resolved from a revision URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub message: String,
    pub html_url: Option<String>,
}

impl CommitInfo {
    /// Email if known, otherwise the author's name.
    pub fn author_identity(&self) -> Option<&str> {
        self.author_email
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.author_name.as_deref().filter(|s| !s.is_empty()))
    }
}

/// One point of the recent-runs trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPoint {
    /// Wall-clock duration in whole seconds.
    Duration(i64),
    Failure,
    Unknown,
}

impl std::fmt::Display for TrendPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendPoint::Duration(secs) => write!(f, "{secs}"),
            TrendPoint::Failure => f.write_str("F"),
            TrendPoint::Unknown => f.write_str("?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub status_changed: bool,
    pub cur_status: ExecutionStatus,
    pub prev_status: Option<ExecutionStatus>,
    pub trend: Option<Vec<TrendPoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Good,
    Warning,
    Danger,
    Neutral,
}

impl Color {
    /// Value understood by chat attachment renderers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Good => "good",
            Color::Warning => "warning",
            Color::Danger => "danger",
            Color::Neutral => "#AAAAAA",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub text: String,
    pub is_short: bool,
}

/// A composed, channel-agnostic notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub heading: String,
    pub color: Color,
    /// Epoch seconds of the triggering event.
    pub timestamp: i64,
    pub fields: Vec<Field>,
    pub footer: Option<String>,
}

/// Everything learned about one event before composition.
///
/// Each enrichment step contributes exactly one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub event: PipelineEvent,
    pub execution_info: ExecutionInfo,
    pub summary: Option<Summary>,
    pub stage_error: Option<StageErrorInfo>,
    pub commit: Option<CommitInfo>,
}
