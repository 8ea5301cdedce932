use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::types::{
    GetPipelineExecutionRequest, GetPipelineExecutionResponse, GetPipelineStateRequest,
    GetPipelineStateResponse, ListPipelineExecutionsRequest, ListPipelineExecutionsResponse,
};
use crate::error::{CINotifyError, Result};
use crate::model::{ExecutionInfo, RunHistoryEntry, Stage};
use crate::providers::{ActionFailureProvider, ExecutionInfoProvider, RunHistoryProvider};

const TARGET_PREFIX: &str = "CodePipeline_20150709";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const PROVIDER: &str = "CodePipeline";
pub(super) const HISTORY_PAGE_SIZE: u32 = 50;

/// Client for the pipeline execution API (JSON 1.1 protocol).
///
/// Requests are sent unsigned; `endpoint` is expected to accept them
/// (a signing proxy or an emulator).
pub struct CodePipelineClient {
    client: Client,
    endpoint: Url,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl CodePipelineClient {
    /// Creates a client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CINotifyError::Config`] if the endpoint is not a valid URL or
    /// the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cinotify/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| CINotifyError::Config(format!("Failed to create HTTP client: {e}")))?;

        let endpoint = Url::parse(endpoint)
            .map_err(|e| CINotifyError::Config(format!("Invalid CodePipeline endpoint: {e}")))?;

        Ok(Self { client, endpoint })
    }

    async fn call<Req, Resp>(&self, operation: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        debug!("Calling {PROVIDER} {operation}");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(serde_json::to_vec(request)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(ApiErrorBody {
                    kind: Some(kind),
                    message,
                }) => CINotifyError::Provider {
                    provider: PROVIDER.to_string(),
                    message: format!(
                        "{operation}: {kind} ({})",
                        message.unwrap_or_default()
                    ),
                },
                _ => CINotifyError::ApiError {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ExecutionInfoProvider for CodePipelineClient {
    async fn get_execution(
        &self,
        pipeline_name: &str,
        execution_id: &str,
    ) -> Result<ExecutionInfo> {
        let request = GetPipelineExecutionRequest {
            pipeline_name,
            pipeline_execution_id: execution_id,
        };

        let response: GetPipelineExecutionResponse =
            self.call("GetPipelineExecution", &request).await?;

        response
            .pipeline_execution
            .and_then(|e| e.into_execution_info(execution_id))
            .ok_or_else(|| CINotifyError::Provider {
                provider: PROVIDER.to_string(),
                message: format!("no status for execution {execution_id} of {pipeline_name}"),
            })
    }
}

#[async_trait]
impl RunHistoryProvider for CodePipelineClient {
    async fn list_executions(&self, pipeline_name: &str) -> Result<Vec<RunHistoryEntry>> {
        let request = ListPipelineExecutionsRequest {
            pipeline_name,
            max_results: HISTORY_PAGE_SIZE,
        };

        let response: ListPipelineExecutionsResponse =
            self.call("ListPipelineExecutions", &request).await?;

        let total = response.pipeline_execution_summaries.len();
        let entries: Vec<RunHistoryEntry> = response
            .pipeline_execution_summaries
            .into_iter()
            .filter_map(|s| s.into_entry())
            .collect();

        if entries.len() < total {
            debug!(
                "Skipped {} incomplete execution summaries for {pipeline_name}",
                total - entries.len()
            );
        }

        Ok(entries)
    }
}

#[async_trait]
impl ActionFailureProvider for CodePipelineClient {
    async fn get_state(&self, pipeline_name: &str) -> Result<Vec<Stage>> {
        let request = GetPipelineStateRequest {
            name: pipeline_name,
        };

        let response: GetPipelineStateResponse = self.call("GetPipelineState", &request).await?;

        Ok(response.stage_states)
    }
}
