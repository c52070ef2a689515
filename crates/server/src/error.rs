//! Structured errors for the mcp-offline server.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Errors raised by the host itself rather than the worker or the cache.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid tool parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No worker version is active yet.
    #[error("NO_ACTIVE_WORKER: {0}")]
    NoActiveWorker(String),

    /// A tool result could not be serialized.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<ServerError> for McpError {
    fn from(err: ServerError) -> Self {
        let code = match &err {
            ServerError::InvalidInput(_) => -32602,
            ServerError::NoActiveWorker(_) => -32008,
            ServerError::Serialize(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
