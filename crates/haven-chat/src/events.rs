//! Chat session event types

use haven_api::Turn;
use serde::{Deserialize, Serialize};

/// Events emitted while a response streams in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// The backend accepted the query and the response stream opened
    TurnStart,

    /// Render snapshot of the in-flight response. `content` is the whole
    /// accumulated buffer, not a delta.
    TurnUpdate { content: String },

    /// The response closed and was appended to the transcript
    TurnEnd { turn: Turn },

    /// The turn failed; `message` is what the user should see
    Error { message: String },
}

impl ChatEvent {
    /// Check if this is a terminal event
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::TurnEnd { .. } | ChatEvent::Error { .. })
    }
}
