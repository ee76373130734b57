//! hometown - terminal chat with the hometown chatbot

mod commands;
mod config;
mod utils;

use std::io::{self, Write};

use clap::Parser;
use hometown_chat::{ChatEvent, SendOutcome, StreamingChatClient};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// hometown - chat with the hometown mentor bot
#[derive(Parser, Debug)]
#[command(name = "hometown")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gateway base URL (default: http://localhost:8000)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Chat endpoint path (default: /api/chat)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// System message to seed the conversation with
    #[arg(short, long)]
    system: Option<String>,

    /// Seconds to wait for each chunk of a reply
    #[arg(long)]
    read_timeout: Option<u64>,

    /// Send a single message and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    let filter = if args.verbose {
        EnvFilter::new("hometown=debug,hometown_chat=debug,hometown_ai=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Merge config with CLI args (CLI takes precedence)
    let cfg = config::Config::load();
    let chat_config = cfg.chat_config(config::Overrides {
        base_url: args.base_url,
        endpoint_path: args.endpoint,
        system_prompt: args.system,
        read_timeout_secs: args.read_timeout,
    });

    let client = StreamingChatClient::connect(chat_config)?;
    tracing::debug!(
        session = %client.session_id(),
        url = %client.config().endpoint_url(),
        "chat session started"
    );

    // Non-interactive mode
    if let Some(command) = args.command {
        let outcome = send_and_print(&client, &command).await?;
        if matches!(outcome, SendOutcome::Failed { .. }) {
            std::process::exit(1);
        }
        return Ok(());
    }

    run_interactive(&client).await
}

/// Print reply fragments as they stream in, until the send ends.
fn spawn_printer(client: &StreamingChatClient) -> JoinHandle<()> {
    let mut receiver = client.subscribe();
    let connection_failed = client.config().connection_failed_text.clone();

    tokio::spawn(async move {
        while let Some(event) = next_event(&mut receiver).await {
            match event {
                ChatEvent::Fragment { text } | ChatEvent::ServerError { text } => {
                    print!("{}", text);
                    io::stdout().flush().ok();
                }
                ChatEvent::TransportFailure { message } => {
                    // The partial reply was replaced; show the replacement on its own line.
                    println!("\n{}", connection_failed);
                    tracing::debug!("transport failure: {}", message);
                }
                ChatEvent::Cancelled => {
                    print!(" [stopped]");
                }
                ChatEvent::SendEnd { .. } => {
                    println!();
                    break;
                }
                ChatEvent::SendStart { .. } => {}
            }
        }
    })
}

/// Next event for the printer, skipping over a lag instead of stopping.
async fn next_event(receiver: &mut broadcast::Receiver<ChatEvent>) -> Option<ChatEvent> {
    loop {
        match receiver.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "printer fell behind the reply stream");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Send one message, streaming the reply to stdout. Ctrl-C aborts the send.
async fn send_and_print(client: &StreamingChatClient, input: &str) -> anyhow::Result<SendOutcome> {
    let printer = spawn_printer(client);

    let send = client.send_message(input);
    tokio::pin!(send);
    let outcome = tokio::select! {
        outcome = &mut send => outcome,
        _ = tokio::signal::ctrl_c() => {
            client.abort();
            send.await
        }
    };

    // Printer exits on SendEnd; a rejected send never emits one.
    if outcome.is_err() {
        printer.abort();
    }
    let _ = printer.await;

    Ok(outcome?)
}

async fn run_interactive(client: &StreamingChatClient) -> anyhow::Result<()> {
    // Show minimal startup info (only if TTY)
    if io::IsTerminal::is_terminal(&io::stderr()) {
        eprintln!("hometown ({})", client.config().endpoint_url());
        eprintln!("Type /help for commands.");
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if let Some(result) = commands::execute_command(input, client) {
            match result {
                commands::CommandResult::Clear => {
                    client.reset()?;
                    println!("Cleared conversation.");
                }
                commands::CommandResult::Exit => break,
                commands::CommandResult::Message(msg) => println!("{}", msg),
                commands::CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        if let Err(e) = send_and_print(client, input).await {
            eprintln!("Error: {}", e);
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_next_event_survives_lag() {
        let (tx, mut rx) = broadcast::channel(2);
        for i in 0..5 {
            tx.send(ChatEvent::Fragment {
                text: i.to_string(),
            })
            .unwrap();
        }
        tx.send(ChatEvent::SendEnd {
            outcome: SendOutcome::Cancelled,
        })
        .unwrap();

        let event = next_event(&mut rx).await;
        assert!(matches!(event, Some(ChatEvent::Fragment { ref text }) if text == "4"));
        assert!(matches!(next_event(&mut rx).await, Some(ChatEvent::SendEnd { .. })));

        drop(tx);
        assert!(next_event(&mut rx).await.is_none());
    }
}
