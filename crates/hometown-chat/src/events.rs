//! Chat event types

use serde::{Deserialize, Serialize};

/// How a send ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SendOutcome {
    /// The stream ran to its end. `server_error` is set when the server
    /// reported an internal error in-band.
    Completed { server_error: bool },
    /// Connection, status, read, or timeout failure
    Failed { reason: String },
    /// Aborted through the handle
    Cancelled,
}

impl SendOutcome {
    /// Whether the reply stream reached its end
    pub fn is_completed(&self) -> bool {
        matches!(self, SendOutcome::Completed { .. })
    }
}

/// Events emitted while a message is sent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// User message and reply placeholder were appended
    SendStart { user_text: String },

    /// A fragment was appended to the reply
    Fragment { text: String },

    /// Server-error sentinel seen; `text` was appended to the reply
    ServerError { text: String },

    /// The reply was replaced with the connection-failure text
    TransportFailure { message: String },

    /// The send was aborted; partial reply kept
    Cancelled,

    /// The send finished and loading was cleared
    SendEnd { outcome: SendOutcome },
}

impl ChatEvent {
    /// Check if this is a terminal event
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::SendEnd { .. })
    }
}
