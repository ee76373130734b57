//! Conversation state: messages and the loading flag.

use hometown_ai::{ConversationMessage, Role};

/// Conversation state for one chat session.
///
/// Messages are append-only. While a reply is streaming, the last message is
/// the assistant reply in progress and is the only entry that changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    /// Conversation messages in chronological order
    pub messages: Vec<ConversationMessage>,
    /// Whether a send is in flight
    pub is_loading: bool,
}

impl ConversationState {
    /// Create a conversation, optionally seeded with a system message
    pub fn new(system_prompt: Option<&str>) -> Self {
        let mut state = Self::default();
        state.seed(system_prompt);
        state
    }

    fn seed(&mut self, system_prompt: Option<&str>) {
        if let Some(prompt) = system_prompt {
            self.messages.push(ConversationMessage::system(prompt));
        }
    }

    /// Drop every message and re-apply the seed
    pub fn reset(&mut self, system_prompt: Option<&str>) {
        self.messages.clear();
        self.is_loading = false;
        self.seed(system_prompt);
    }

    /// Append a message
    pub fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    /// The last message, if any
    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    /// Replace the content of the trailing assistant message.
    ///
    /// Returns `false` (and changes nothing) when the tail isn't an assistant
    /// message.
    pub fn replace_tail(&mut self, content: &str) -> bool {
        match self.messages.last_mut() {
            Some(tail) if tail.role == Role::Assistant => {
                tail.content.clear();
                tail.content.push_str(content);
                true
            }
            _ => false,
        }
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_state() {
        let state = ConversationState::new(Some("you are a mentor"));
        assert_eq!(state.messages, vec![ConversationMessage::system("you are a mentor")]);
        assert!(!state.is_loading);
        assert!(ConversationState::new(None).is_empty());
    }

    #[test]
    fn test_replace_tail_only_touches_assistant() {
        let mut state = ConversationState::new(None);
        state.push(ConversationMessage::user("hi"));
        assert!(!state.replace_tail("nope"));
        assert_eq!(state.last().unwrap().content, "hi");

        state.push(ConversationMessage::placeholder());
        assert!(state.replace_tail("Hello"));
        assert!(state.replace_tail("Hello there"));
        assert_eq!(
            state.messages,
            vec![
                ConversationMessage::user("hi"),
                ConversationMessage::assistant("Hello there"),
            ]
        );
    }

    #[test]
    fn test_replace_tail_on_empty() {
        let mut state = ConversationState::default();
        assert!(!state.replace_tail("x"));
    }

    #[test]
    fn test_reset_reapplies_seed() {
        let mut state = ConversationState::new(Some("seed"));
        state.push(ConversationMessage::user("a"));
        state.push(ConversationMessage::assistant("b"));
        state.is_loading = true;
        state.reset(Some("seed"));
        assert_eq!(state, ConversationState::new(Some("seed")));
    }
}
