//! Upstream collaborators the enricher consumes, and their HTTP clients.

mod codepipeline;
mod github;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{CommitInfo, ExecutionInfo, RunHistoryEntry, Stage};

pub use codepipeline::CodePipelineClient;
pub use github::{parse_revision_uri, GitHubClient};

/// Current detail of one pipeline execution.
#[async_trait]
pub trait ExecutionInfoProvider: Send + Sync {
    async fn get_execution(&self, pipeline_name: &str, execution_id: &str)
        -> Result<ExecutionInfo>;
}

/// Recent executions of a pipeline, newest first.
#[async_trait]
pub trait RunHistoryProvider: Send + Sync {
    async fn list_executions(&self, pipeline_name: &str) -> Result<Vec<RunHistoryEntry>>;
}

/// Current stage/action state tree of a pipeline.
#[async_trait]
pub trait ActionFailureProvider: Send + Sync {
    async fn get_state(&self, pipeline_name: &str) -> Result<Vec<Stage>>;
}

/// Commit metadata behind a revision URL.
#[async_trait]
pub trait CommitInfoProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`crate::error::CINotifyError::Parse`] if `revision_url` is not a
    /// commit URL, or a transport error if the lookup fails.
    async fn resolve(&self, revision_url: &str) -> Result<CommitInfo>;
}
