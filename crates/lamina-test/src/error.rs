//! Test error types.

use thiserror::Error;

/// Errors that can occur while building a test event or reading a response.
#[derive(Debug, Error)]
pub enum TestError {
    /// Request building failed
    #[error("Request build error: {0}")]
    RequestBuild(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Header name is invalid
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}
