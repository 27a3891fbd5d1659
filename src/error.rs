//! Error types for the weft client.
//!
//! The reconciliation core (router, store, row cache, prediction
//! controller) never returns errors; anything inapplicable degrades to a
//! no-op or a diagnostic entry. These types cover the fallible edges: the
//! backend transport and process startup.

use thiserror::Error;

/// Result alias for backend-facing calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Failures talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("event stream error: {0}")]
    Stream(String),
}

impl BackendError {
    /// Whether retrying the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Connection(_) | BackendError::Stream(_) => true,
            BackendError::Server { status, .. } => *status >= 500,
            BackendError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Connection(err.to_string())
        }
    }
}
