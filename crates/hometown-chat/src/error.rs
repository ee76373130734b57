//! Error types for hometown-chat

use thiserror::Error;

/// Result type alias using hometown-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned to callers of the chat client.
///
/// Failures while a reply streams never show up here: they are turned into
/// conversation content and reported through [`SendOutcome`](crate::SendOutcome).
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the wire layer
    #[error(transparent)]
    Ai(#[from] hometown_ai::Error),

    /// Another send is still streaming
    #[error("A message is already being sent")]
    SendInProgress,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
