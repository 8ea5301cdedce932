mod links;

use crate::model::{
    CommitInfo, EnrichmentRecord, ExecutionInfo, Field, Notification, PipelineEvent, Revision,
    StageErrorInfo, Summary,
};

use links::{link, pipeline_console_url, short_revision};

/// Visible characters kept from free-form text (error messages, commit
/// summaries) before an ellipsis is appended.
pub const MAX_TEXT_CHARS: usize = 50;
const ELLIPSIS: &str = "…";

/// Renders enrichment records into notifications.
///
/// Composition is a pure transform: the same record always yields the same
/// notification.
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    region: String,
}

impl NotificationComposer {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    pub fn compose(&self, record: &EnrichmentRecord) -> Notification {
        self.compose_parts(
            &record.event,
            &record.execution_info,
            record.summary.as_ref(),
            record.stage_error.as_ref(),
            record.commit.as_ref(),
        )
    }

    /// Builds a notification from individually resolved parts.
    ///
    /// Fields are ordered error first, then revision. The footer is the
    /// commit author followed by the trend, either of which may be absent.
    pub fn compose_parts(
        &self,
        event: &PipelineEvent,
        execution_info: &ExecutionInfo,
        summary: Option<&Summary>,
        stage_error: Option<&StageErrorInfo>,
        commit: Option<&CommitInfo>,
    ) -> Notification {
        let mut fields = Vec::new();

        if let Some(error) = stage_error {
            fields.push(error_field(error));
        }

        if let Some(field) = execution_info.latest_revision().and_then(revision_field) {
            fields.push(field);
        }

        Notification {
            heading: self.heading(event, execution_info, summary),
            color: execution_info.status.color(),
            timestamp: event.time.timestamp(),
            fields,
            footer: footer(commit, summary),
        }
    }

    fn heading(
        &self,
        event: &PipelineEvent,
        execution_info: &ExecutionInfo,
        summary: Option<&Summary>,
    ) -> String {
        let url = pipeline_console_url(&self.region, &event.pipeline_name);
        let name = format!("*{}*", link(&url, &escape(&event.pipeline_name)));

        match summary.filter(|s| s.status_changed) {
            Some(summary) => format!("{name}: Status changed to *{}*", summary.cur_status),
            None => format!("{name}: Still *{}*", execution_info.status),
        }
    }
}

/// Whether a notification should also go to the escalation channel: the
/// status changed and the new status is terminal.
pub fn is_escalation(summary: Option<&Summary>) -> bool {
    summary.is_some_and(|s| s.status_changed && s.cur_status.is_important())
}

fn error_field(error: &StageErrorInfo) -> Field {
    let label = escape(&format!("{}/{}", error.stage_name, error.action_name));
    let location = error
        .external_execution_url
        .as_deref()
        .or(error.entity_url.as_deref())
        .map_or_else(|| label.clone(), |url| link(url, &label));

    Field {
        text: format!(
            "*Failed:* {location} `{}`: \"{}\"",
            escape(&error.code),
            escape(&truncate(&error.message, MAX_TEXT_CHARS))
        ),
        is_short: false,
    }
}

/// `None` when the revision carries no id to show.
fn revision_field(revision: &Revision) -> Option<Field> {
    let id = escape(short_revision(revision.revision_id.as_deref()?));
    let commit = revision
        .revision_url
        .as_deref()
        .map_or_else(|| id.clone(), |url| link(url, &id));

    let text = match revision.revision_summary.as_deref() {
        Some(summary) if !summary.trim().is_empty() => format!(
            "*Commit:* {commit} \"_{}_\"",
            escape(&truncate(summary, MAX_TEXT_CHARS))
        ),
        _ => format!("*Commit:* {commit}"),
    };

    Some(Field {
        text,
        is_short: false,
    })
}

fn footer(commit: Option<&CommitInfo>, summary: Option<&Summary>) -> Option<String> {
    let author = commit.and_then(CommitInfo::author_identity).map(escape);
    let trend = summary
        .and_then(|s| s.trend.as_deref())
        .filter(|t| !t.is_empty())
        .map(|points| {
            let values: Vec<String> = points.iter().map(ToString::to_string).collect();
            format!("trend: [{}]", values.join(","))
        });

    match (author, trend) {
        (Some(author), Some(trend)) => Some(format!("{author} | {trend}")),
        (Some(author), None) => Some(author),
        (None, trend) => trend,
    }
}

/// Escapes the characters chat markup treats as control characters.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Collapses each run of line breaks to a single space, then cuts to `max_chars`
/// characters, appending an ellipsis when anything was removed.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                collapsed.push(' ');
            }
            in_break = true;
        } else {
            collapsed.push(c);
            in_break = false;
        }
    }

    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let mut truncated: String = collapsed.chars().take(max_chars).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
