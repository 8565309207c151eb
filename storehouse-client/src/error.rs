/// Error types for the Storehouse client.

use thiserror::Error;

/// Failures reading or writing the state file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File could not be read or written.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File exists but is not a JSON object of strings.
    #[error("storage file is corrupt: {0}")]
    Corrupt(String),

    /// Value could not be encoded.
    #[error("failed to encode {key}: {reason}")]
    Encode { key: String, reason: String },
}

/// Errors from API calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    ///
    /// `message` is the server's own message when it sent one.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Base URL is not usable.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// Response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
