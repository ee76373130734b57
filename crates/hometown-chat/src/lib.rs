//! hometown-chat: streaming chat client
//!
//! This crate owns the conversation state of a chat session and the send
//! loop that streams the assistant's reply into it fragment by fragment.

pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod handle;

pub use client::StreamingChatClient;
pub use config::ChatConfig;
pub use conversation::ConversationState;
pub use error::{Error, Result};
pub use events::{ChatEvent, SendOutcome};
pub use handle::{AbortOnDrop, ChatHandle};
