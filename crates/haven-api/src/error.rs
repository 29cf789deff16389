//! Error types for haven-api

use thiserror::Error;

/// Result type alias using haven-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the haven backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned an error response
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Streamed body contained bytes that are not valid UTF-8
    #[error("invalid UTF-8 in stream at byte offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Stream ended in the middle of a multi-byte character
    #[error("stream ended mid-character ({pending} byte(s) pending)")]
    TruncatedUtf8 { pending: usize },

    /// The request requires a logged-in, verified account
    #[error("authentication required: {0}")]
    AuthRequired(String),

    /// Base URL or endpoint path could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// File to upload could not be read
    #[error("upload error: {0}")]
    Upload(String),

    /// Unexpected response shape
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create a server error from status and message
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Check if this error came from the transport rather than the backend
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// Check if this error is a stream decode failure
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::InvalidUtf8 { .. } | Error::TruncatedUtf8 { .. })
    }

    /// The message the user should see for this error
    pub fn user_message(&self) -> String {
        match self {
            Error::Server { message, .. } => message.clone(),
            Error::AuthRequired(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
