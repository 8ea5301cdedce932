use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Color;

/// Status of a pipeline execution as reported upstream.
///
/// Unrecognised values are kept verbatim in `Other` so they still render,
/// and fall back to the neutral color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionStatus {
    InProgress,
    Succeeded,
    Superseded,
    Failed,
    Other(String),
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ExecutionStatus::InProgress => "InProgress",
            ExecutionStatus::Succeeded => "Succeeded",
            ExecutionStatus::Superseded => "Superseded",
            ExecutionStatus::Failed => "Failed",
            ExecutionStatus::Other(s) => s,
        }
    }

    /// Terminal, user-meaningful statuses. Transient ones never drive a
    /// status-change decision.
    pub fn is_important(&self) -> bool {
        matches!(self, ExecutionStatus::Succeeded | ExecutionStatus::Failed)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionStatus::Failed)
    }

    pub fn color(&self) -> Color {
        match self {
            ExecutionStatus::InProgress => Color::Warning,
            ExecutionStatus::Succeeded => Color::Good,
            ExecutionStatus::Superseded => Color::Warning,
            ExecutionStatus::Failed => Color::Danger,
            ExecutionStatus::Other(_) => Color::Neutral,
        }
    }
}

impl From<&str> for ExecutionStatus {
    fn from(value: &str) -> Self {
        match value {
            "InProgress" => ExecutionStatus::InProgress,
            "Succeeded" => ExecutionStatus::Succeeded,
            "Superseded" => ExecutionStatus::Superseded,
            "Failed" => ExecutionStatus::Failed,
            other => ExecutionStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for ExecutionStatus {
    fn from(value: String) -> Self {
        ExecutionStatus::from(value.as_str())
    }
}

impl From<ExecutionStatus> for String {
    fn from(value: ExecutionStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
