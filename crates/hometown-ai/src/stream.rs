//! Event framing for the chat endpoint's streamed response
//!
//! The body is line-oriented text: each event is `data: <text>` followed by a
//! blank line. [`EventFramer`] turns raw chunks into [`StreamEvent`]s.

use crate::decode::Utf8StreamDecoder;

/// Separator between events
pub const EVENT_SEPARATOR: &str = "\n\n";

/// Prefix of a data-carrying event
pub const DATA_PREFIX: &str = "data: ";

/// In-band marker the server uses to report a failure
pub const SERVER_ERROR_SENTINEL: &str = "[INTERNAL_SERVER_ERROR]";

/// Something extracted from one framed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Text to append to the reply
    Fragment(String),
    /// The server signalled an internal error
    ServerError,
}

/// Classify a single event segment.
///
/// Returns `None` for segments that don't carry the `data: ` prefix.
pub fn parse_segment(segment: &str) -> Option<StreamEvent> {
    let fragment = segment.strip_prefix(DATA_PREFIX)?;
    if fragment.contains(SERVER_ERROR_SENTINEL) {
        Some(StreamEvent::ServerError)
    } else {
        Some(StreamEvent::Fragment(fragment.to_string()))
    }
}

/// Turn the segments completed by one read into events.
///
/// A server error ends the batch: it is reported and the segments after it
/// are dropped. Reading continues with the next chunk.
fn collect_events<'a>(segments: impl IntoIterator<Item = &'a str>) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    for segment in segments {
        match parse_segment(segment) {
            Some(StreamEvent::ServerError) => {
                events.push(StreamEvent::ServerError);
                break;
            }
            Some(event) => events.push(event),
            None => {}
        }
    }
    events
}

/// Byte offset of the first separator at or after `from`
fn find_separator(buffer: &str, from: usize) -> Option<usize> {
    buffer.as_bytes()[from..]
        .windows(EVENT_SEPARATOR.len())
        .position(|w| w == EVENT_SEPARATOR.as_bytes())
        .map(|pos| from + pos)
}

/// Stateful decoder + framer for one response body
#[derive(Debug, Default)]
pub struct EventFramer {
    decoder: Utf8StreamDecoder,
    buffer: String,
    /// Offset in `buffer` already searched for a separator
    scanned: usize,
}

impl EventFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk read from the body
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let text = self.decoder.decode(chunk);
        self.buffer.push_str(&text);

        let mut segments = Vec::new();
        let mut start = 0;
        while let Some(idx) = find_separator(&self.buffer, self.scanned.max(start)) {
            segments.push(self.buffer[start..idx].to_string());
            start = idx + EVENT_SEPARATOR.len();
        }
        self.buffer.drain(..start);
        // A separator may straddle the end of what has arrived so far.
        self.scanned = self
            .buffer
            .len()
            .saturating_sub(EVENT_SEPARATOR.len() - 1);

        collect_events(segments.iter().map(String::as_str))
    }

    /// Flush at end of stream; an unterminated final event is still delivered
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let tail = self.decoder.finish();
        self.buffer.push_str(&tail);
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        if rest.is_empty() {
            return Vec::new();
        }
        collect_events(rest.split(EVENT_SEPARATOR))
    }

    /// Text received but not yet terminated by a blank line
    pub fn buffered(&self) -> &str {
        &self.buffer
    }
}
