//! Error types for haven-chat

use thiserror::Error;

/// Result type alias using haven-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a chat session
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the backend API layer
    #[error(transparent)]
    Api(#[from] haven_api::Error),

    /// A response is already streaming
    #[error("a response is already streaming")]
    Busy,

    /// Personalized queries need more conversation history
    #[error("need at least {need} turns of history, have {have}")]
    HistoryTooShort { have: usize, need: usize },

    /// Saved-property state could not be read or written
    #[error("store error: {0}")]
    Store(String),

    /// The guest compare allowance is used up
    #[error("log in to keep using compare")]
    CompareLimitReached,

    /// A filter draft failed validation
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl Error {
    /// The message the user should see for this error
    pub fn user_message(&self) -> String {
        match self {
            Error::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
