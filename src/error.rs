//! Error types for backend calls and theme storage.

use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connect, timeout, reset).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}")]
    Status { status: u16 },
    /// The body was not the JSON shape the endpoint promises.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid backend url {url:?}")]
    InvalidUrl { url: String },
    /// Raised by in-process backends that fail on purpose.
    #[error("{0}")]
    Unavailable(String),
}

impl ClientError {
    /// Transport and status failures are worth distinguishing in logs from
    /// decode failures, which usually mean a misconfigured base URL.
    pub fn is_decode(&self) -> bool {
        matches!(self, ClientError::Decode(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        if let Some(status) = value.status() {
            return ClientError::Status {
                status: status.as_u16(),
            };
        }
        ClientError::Transport(value)
    }
}

/// Failure while reading or writing the persisted theme preference.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("theme file io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("theme file encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
