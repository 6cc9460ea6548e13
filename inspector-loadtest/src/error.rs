// Load test errors

use inspector_http_client::HttpClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadTestError {
    #[error("Invalid load test configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid backend target '{0}': expected LABEL=MARKER")]
    InvalidTarget(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] HttpClientError),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoadTestError>;
