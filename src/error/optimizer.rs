use reqwest::StatusCode;
use sqlpilot_schema::OpenaiErrorBody;
use thiserror::Error as ThisError;

use super::IsRetryable;

#[derive(Debug, ThisError)]
pub enum OptimizerError {
    /// Neither `optimizer.api_key` nor `OPENAI_API_KEY` is set.
    #[error("No API key configured; set optimizer.api_key or OPENAI_API_KEY")]
    MissingApiKey,

    #[error("Invalid proxy url: {0}")]
    InvalidProxy(String),

    /// Transport-level failure (DNS, connect, timeouts, etc).
    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Upstream returned a structured `{"error": {...}}` body (auth, quota, unknown model).
    #[error("Upstream error: status={status}, message={}", body.inner.message)]
    UpstreamMapped {
        status: StatusCode,
        body: OpenaiErrorBody,
    },

    /// Upstream error without a recognizable error envelope.
    #[error("Upstream fallback error: status={status}, body={body:.200}")]
    UpstreamFallback { status: StatusCode, body: String },

    #[error("Failed to decode completion: {0}")]
    Decode(#[from] serde_json::Error),

    /// Success status but no choice carried message text.
    #[error("Completion contained no message text")]
    EmptyCompletion,
}

impl OptimizerError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            OptimizerError::UpstreamMapped { status, .. }
            | OptimizerError::UpstreamFallback { status, .. } => Some(*status),
            OptimizerError::Reqwest(e) => e.status(),
            _ => None,
        }
    }
}

impl IsRetryable for OptimizerError {
    fn is_retryable(&self) -> bool {
        match self {
            OptimizerError::Reqwest(_) => true,
            OptimizerError::UpstreamMapped { status, .. }
            | OptimizerError::UpstreamFallback { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            OptimizerError::MissingApiKey
            | OptimizerError::InvalidProxy(_)
            | OptimizerError::Decode(_)
            | OptimizerError::EmptyCompletion => false,
        }
    }
}
