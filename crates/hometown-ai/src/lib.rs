//! hometown-ai: wire layer for the hometown chat endpoint
//!
//! This crate provides the conversation message types, the error type, the
//! incremental decoder and event framer for streamed replies, and the
//! transport seam used to reach the chat endpoint.

pub mod decode;
pub mod error;
pub mod stream;
pub mod transport;
pub mod types;

pub use decode::Utf8StreamDecoder;
pub use error::{Error, Result};
pub use stream::{EventFramer, StreamEvent};
pub use transport::{ByteStream, ChatResponse, ChatTransport, HttpTransport};
pub use types::*;
