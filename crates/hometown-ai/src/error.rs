//! Error types for hometown-ai

use std::time::Duration;
use thiserror::Error;

/// Result type alias using hometown-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the chat endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response carried no readable body
    #[error("Response body is not readable as a stream")]
    StreamUnavailable,

    /// The response or its next chunk didn't arrive within the read timeout
    #[error("Timed out after {0:?} waiting for the server")]
    Timeout(Duration),

    /// Reading the body failed mid-stream
    #[error("Stream error: {0}")]
    Stream(String),

    /// Send was aborted by the caller
    #[error("Request aborted")]
    Aborted,
}

impl Error {
    /// Create a status error from a response code and body text
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Whether this error ends a send on the connection-failure path.
    ///
    /// These are the failures that replace the in-progress reply with the
    /// localized "could not connect" text.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::Status { .. }
                | Error::StreamUnavailable
                | Error::Timeout(_)
                | Error::Stream(_)
        )
    }
}
