use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ExecutionInfo, Revision, RunHistoryEntry, Stage};
use crate::status::ExecutionStatus;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GetPipelineExecutionRequest<'a> {
    pub pipeline_name: &'a str,
    pub pipeline_execution_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListPipelineExecutionsRequest<'a> {
    pub pipeline_name: &'a str,
    pub max_results: u32,
}

#[derive(Debug, Serialize)]
pub(super) struct GetPipelineStateRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GetPipelineExecutionResponse {
    pub pipeline_execution: Option<PipelineExecution>,
}

/// A pipeline execution as returned by `GetPipelineExecution`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PipelineExecution {
    pub pipeline_execution_id: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub artifact_revisions: Vec<ArtifactRevision>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ArtifactRevision {
    pub revision_id: Option<String>,
    pub revision_summary: Option<String>,
    pub revision_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListPipelineExecutionsResponse {
    #[serde(default)]
    pub pipeline_execution_summaries: Vec<PipelineExecutionSummary>,
}

/// Timestamps are epoch seconds with a fractional part.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PipelineExecutionSummary {
    pub pipeline_execution_id: Option<String>,
    pub status: Option<String>,
    pub start_time: Option<f64>,
    pub last_update_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GetPipelineStateResponse {
    #[serde(default)]
    pub stage_states: Vec<Stage>,
}

impl PipelineExecution {
    /// Keeps revisions in provider order, most recent first; `None` if there
    /// is no status.
    pub fn into_execution_info(self, requested_id: &str) -> Option<ExecutionInfo> {
        let status = ExecutionStatus::from(self.status?);

        let artifact_revisions = self
            .artifact_revisions
            .into_iter()
            .map(|r| Revision {
                revision_id: r.revision_id,
                revision_url: r.revision_url,
                revision_summary: r.revision_summary,
            })
            .collect();

        Some(ExecutionInfo {
            execution_id: self
                .pipeline_execution_id
                .unwrap_or_else(|| requested_id.to_string()),
            status,
            artifact_revisions,
        })
    }
}

impl PipelineExecutionSummary {
    pub fn into_entry(self) -> Option<RunHistoryEntry> {
        Some(RunHistoryEntry {
            execution_id: self.pipeline_execution_id?,
            status: ExecutionStatus::from(self.status?),
            start_time: self.start_time.and_then(epoch_seconds),
            last_update_time: self.last_update_time.and_then(epoch_seconds),
        })
    }
}

fn epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let millis = (secs * 1000.0).round() as i64;
    DateTime::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_with_fractional_timestamps() {
        let summary: PipelineExecutionSummary = serde_json::from_str(
            r#"{
                "pipelineExecutionId": "e-1",
                "status": "Succeeded",
                "startTime": 1709294400.25,
                "lastUpdateTime": 1709294712.75
            }"#,
        )
        .unwrap();

        let entry = summary.into_entry().unwrap();
        assert_eq!(entry.status, ExecutionStatus::Succeeded);
        let elapsed = entry.last_update_time.unwrap() - entry.start_time.unwrap();
        assert_eq!(elapsed.num_milliseconds(), 312_500);
    }

    #[test]
    fn test_summary_without_status_is_skipped() {
        let summary: PipelineExecutionSummary =
            serde_json::from_str(r#"{"pipelineExecutionId": "e-1"}"#).unwrap();
        assert!(summary.into_entry().is_none());
    }

    #[test]
    fn test_execution_falls_back_to_requested_id() {
        let execution: PipelineExecution = serde_json::from_str(
            r#"{
                "status": "InProgress",
                "artifactRevisions": [
                    {"revisionSummary": "no id here"},
                    {"revisionId": "abc123", "revisionUrl": "https://github.com/a/b/commit/abc123"}
                ]
            }"#,
        )
        .unwrap();

        let info = execution.into_execution_info("e-9").unwrap();
        assert_eq!(info.execution_id, "e-9");
        assert_eq!(info.status, ExecutionStatus::InProgress);
        assert_eq!(info.artifact_revisions.len(), 2);
        assert_eq!(info.artifact_revisions[0].revision_id, None);
        assert_eq!(
            info.artifact_revisions[1].revision_id.as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_non_finite_timestamp_is_ignored() {
        assert!(epoch_seconds(f64::NAN).is_none());
        assert!(epoch_seconds(f64::INFINITY).is_none());
    }
}
