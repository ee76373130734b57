//! Slash commands for interactive mode

use hometown_chat::StreamingChatClient;

use crate::utils::truncate_chars;

/// Result of executing a slash command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Clear the conversation
    Clear,
    /// Show a message to the user (not sent to the chatbot)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, client: &StreamingChatClient) -> Option<CommandResult> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let command = rest.split_whitespace().next().unwrap_or("").to_lowercase();

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" => CommandResult::Clear,

        "history" | "l" => CommandResult::Message(history_text(client)),

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn history_text(client: &StreamingChatClient) -> String {
    let messages = client.messages();
    if messages.is_empty() {
        return "No messages yet.".to_string();
    }
    messages
        .iter()
        .enumerate()
        .map(|(i, msg)| {
            let preview = truncate_chars(&msg.content, 60).replace('\n', " ");
            format!("  {}: [{}] {}", i, msg.role, preview)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /history, /l         List the messages in this conversation
  /clear, /c           Start a fresh conversation
  /quit, /exit, /q     Exit hometown

Press Ctrl-C while a reply is streaming to stop it."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hometown_chat::ChatConfig;

    fn client() -> StreamingChatClient {
        StreamingChatClient::connect(ChatConfig::default().with_system_prompt("seed")).unwrap()
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(execute_command("hello", &client()), None);
    }

    #[test]
    fn test_known_commands() {
        let c = client();
        assert_eq!(execute_command("/clear", &c), Some(CommandResult::Clear));
        assert_eq!(execute_command("  /Q  ", &c), Some(CommandResult::Exit));
        assert!(matches!(
            execute_command("/help", &c),
            Some(CommandResult::Message(m)) if m.contains("/history")
        ));
    }

    #[test]
    fn test_history_lists_seed() {
        let c = client();
        match execute_command("/history", &c) {
            Some(CommandResult::Message(text)) => assert_eq!(text, "  0: [system] seed"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            execute_command("/model gpt", &client()),
            Some(CommandResult::Unknown("model".into()))
        );
    }
}
