use thiserror::Error;

#[derive(Error, Debug)]
pub enum CINotifyError {
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("{provider} request failed: {message}")]
    Provider { provider: String, message: String },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CINotifyError>;
