//! Error types for the remote data client.
//!
//! Every transport, status, and decoding failure is folded into
//! [`RemoteError`] with a human-readable cause. [`RemoteError::NotFound`]
//! is kept separate because callers report it differently.

/// Errors that can occur while querying the remote game API.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("remote request failed: {0}")]
    Transport(String),

    /// The remote service answered with a non-success status.
    #[error("remote returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder if it could not be read.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("remote response parse failed: {0}")]
    Parse(String),

    /// The lookup succeeded but matched nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was rejected before being sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RemoteError {
    /// Whether retrying the same request could succeed.
    ///
    /// Transport failures, request timeouts, rate limiting and server errors
    /// are retryable. Everything else is final.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            Self::Parse(_) | Self::NotFound(_) | Self::InvalidInput(_) => false,
        }
    }
}
