//! Error types for media generation.

use std::time::Duration;

/// Errors that can occur while queueing, polling or generating media.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// API key missing.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Server answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Response decoded, but a required field was absent or empty.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// The server finished the job but reported an execution failure.
    #[error("job failed: {0}")]
    JobFailed(String),

    /// Polling exceeded the configured deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Polling was abandoned by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error of local data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenError {
    /// Returns the HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the request never got a usable HTTP exchange with
    /// the server. Deadlines and cancellation are not transport errors.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type alias for media generation operations.
pub type Result<T> = std::result::Result<T, GenError>;

/// Decodes a JSON response body, mapping failures to [`GenError::Decode`].
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| GenError::Decode(e.to_string()))
}
