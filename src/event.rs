use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CINotifyError, Result};
use crate::model::PipelineEvent;

pub const EXECUTION_STATE_CHANGE: &str = "CodePipeline Pipeline Execution State Change";

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "detail-type")]
    detail_type: Option<String>,
    time: Option<String>,
    detail: Option<RawDetail>,
}

#[derive(Deserialize)]
struct RawDetail {
    pipeline: Option<String>,
    #[serde(rename = "execution-id")]
    execution_id: Option<String>,
    state: Option<String>,
}

/// Returns true when `raw` (bare or inside a notification envelope) is a
/// pipeline-execution state-change event. Never fails.
pub fn handles(raw: &Value) -> bool {
    match unwrap_envelope(raw) {
        Ok(event) => event
            .get("detail-type")
            .and_then(Value::as_str)
            .is_some_and(|dt| dt == EXECUTION_STATE_CHANGE),
        Err(e) => {
            debug!("Not a pipeline event: {e}");
            false
        }
    }
}

/// Converts a raw state-change payload into a [`PipelineEvent`].
///
/// Accepts the bare event or the `Records[0].Sns.Message` envelope whose
/// message is the event serialized as a JSON string.
///
/// # Errors
///
/// Returns [`CINotifyError::MalformedEvent`] if the payload is not a
/// pipeline-execution state change or any required field is missing.
pub fn normalize(raw: &Value) -> Result<PipelineEvent> {
    let event = unwrap_envelope(raw)?;

    let raw_event: RawEvent = serde_json::from_value(event)
        .map_err(|e| CINotifyError::MalformedEvent(format!("unreadable event: {e}")))?;

    match raw_event.detail_type.as_deref() {
        Some(EXECUTION_STATE_CHANGE) => {}
        Some(other) => {
            return Err(CINotifyError::MalformedEvent(format!(
                "unsupported detail-type '{other}'"
            )))
        }
        None => return Err(missing("detail-type")),
    }

    let time = raw_event.time.ok_or_else(|| missing("time"))?;
    let time = DateTime::parse_from_rfc3339(&time)
        .map_err(|e| CINotifyError::MalformedEvent(format!("invalid time '{time}': {e}")))?
        .with_timezone(&Utc);

    let detail = raw_event.detail.ok_or_else(|| missing("detail"))?;

    Ok(PipelineEvent {
        time,
        pipeline_name: non_empty(detail.pipeline, "detail.pipeline")?,
        execution_id: non_empty(detail.execution_id, "detail.execution-id")?,
        state: non_empty(detail.state, "detail.state")?,
    })
}

fn unwrap_envelope(raw: &Value) -> Result<Value> {
    let Some(records) = raw.get("Records") else {
        return Ok(raw.clone());
    };

    let message = records
        .get(0)
        .and_then(|r| r.get("Sns"))
        .and_then(|sns| sns.get("Message"))
        .and_then(Value::as_str)
        .ok_or_else(|| missing("Records[0].Sns.Message"))?;

    serde_json::from_str(message)
        .map_err(|e| CINotifyError::MalformedEvent(format!("envelope message is not JSON: {e}")))
}

fn non_empty(value: Option<String>, field: &str) -> Result<String> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| missing(field))
}

fn missing(field: &str) -> CINotifyError {
    CINotifyError::MalformedEvent(format!("missing required field '{field}'"))
}
