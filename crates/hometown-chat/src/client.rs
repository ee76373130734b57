//! Streaming chat client

use std::sync::Arc;

use futures::StreamExt;
use hometown_ai::{
    ChatRequest, ChatTransport, ConversationMessage, EventFramer, HttpTransport, StreamEvent,
};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    config::ChatConfig,
    conversation::ConversationState,
    error::{Error, Result},
    events::{ChatEvent, SendOutcome},
    handle::{AbortOnDrop, ChatHandle},
};

/// Sends a conversation to the chat endpoint and streams the reply into it.
///
/// The conversation is published on a `watch` channel, so every fragment
/// produces a complete new snapshot for renderers. Only one send can be in
/// flight; a second call while loading is rejected with
/// [`Error::SendInProgress`].
pub struct StreamingChatClient {
    config: ChatConfig,
    transport: Arc<dyn ChatTransport>,
    session_id: Uuid,
    state_tx: watch::Sender<ConversationState>,
    event_tx: broadcast::Sender<ChatEvent>,
    handle: ChatHandle,
}

impl StreamingChatClient {
    /// Create a client over the given transport
    pub fn new(config: ChatConfig, transport: Arc<dyn ChatTransport>) -> Self {
        let state = ConversationState::new(config.system_prompt.as_deref());
        let (state_tx, _) = watch::channel(state);
        let (event_tx, _) = broadcast::channel(256);
        Self {
            config,
            transport,
            session_id: Uuid::new_v4(),
            state_tx,
            event_tx,
            handle: ChatHandle::new(),
        }
    }

    /// Create a client that posts to `config.endpoint_url()` over HTTP
    pub fn connect(config: ChatConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.endpoint_url(), config.connect_timeout)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Subscribe to chat events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    /// Watch conversation snapshots
    pub fn watch(&self) -> watch::Receiver<ConversationState> {
        self.state_tx.subscribe()
    }

    /// Current conversation snapshot
    pub fn state(&self) -> ConversationState {
        self.state_tx.borrow().clone()
    }

    /// Current messages
    pub fn messages(&self) -> Vec<ConversationMessage> {
        self.state_tx.borrow().messages.clone()
    }

    /// Whether a send is in flight
    pub fn is_loading(&self) -> bool {
        self.handle.is_loading()
    }

    /// Identifier of this chat session
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Get a cloneable handle for aborting or awaiting from outside
    pub fn handle(&self) -> ChatHandle {
        self.handle.clone()
    }

    /// Abort the current send
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Guard that aborts the current send when the owning view goes away
    pub fn abort_on_drop(&self) -> AbortOnDrop {
        self.handle.abort_on_drop()
    }

    /// Start the conversation over from its seed
    pub fn reset(&self) -> Result<()> {
        self.handle.try_begin().ok_or(Error::SendInProgress)?;
        let seed = self.config.system_prompt.as_deref();
        self.state_tx.send_modify(|state| state.reset(seed));
        self.handle.finish();
        Ok(())
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Send a user message and stream the reply into the conversation.
    ///
    /// Transport failures, server errors, and cancellation all end up as
    /// conversation content and a [`SendOutcome`]; the only error returned
    /// is [`Error::SendInProgress`].
    pub async fn send_message(&self, user_text: &str) -> Result<SendOutcome> {
        let cancel = self.handle.try_begin().ok_or(Error::SendInProgress)?;
        let guard = LoadingGuard {
            state_tx: &self.state_tx,
            handle: &self.handle,
        };

        let mut request = ChatRequest::default();
        self.state_tx.send_modify(|state| {
            state.is_loading = true;
            state.push(ConversationMessage::user(user_text));
            request.messages = state.messages.clone();
            state.push(ConversationMessage::placeholder());
        });
        self.emit(ChatEvent::SendStart {
            user_text: user_text.to_string(),
        });
        tracing::debug!(
            session = %self.session_id,
            messages = request.messages.len(),
            "sending chat message"
        );

        let mut reply = String::new();
        let outcome = match self.stream_reply(&request, &cancel, &mut reply).await {
            Ok(server_error) => {
                tracing::debug!(
                    session = %self.session_id,
                    chars = reply.chars().count(),
                    server_error,
                    "reply stream finished"
                );
                SendOutcome::Completed { server_error }
            }
            Err(e) if e.is_transport_failure() => {
                tracing::warn!(session = %self.session_id, error = %e, "chat send failed");
                reply.clear();
                reply.push_str(&self.config.connection_failed_text);
                self.publish_reply(&reply);
                self.emit(ChatEvent::TransportFailure {
                    message: e.to_string(),
                });
                SendOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                tracing::debug!(session = %self.session_id, "send aborted");
                self.emit(ChatEvent::Cancelled);
                SendOutcome::Cancelled
            }
        };

        drop(guard);
        self.emit(ChatEvent::SendEnd {
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// Open the response and fold its events into `reply`.
    /// Returns whether the server reported an error in-band.
    async fn stream_reply(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
        reply: &mut String,
    ) -> hometown_ai::Result<bool> {
        let read_timeout = self.config.read_timeout;
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(hometown_ai::Error::Aborted),
            response = tokio::time::timeout(read_timeout, self.transport.open(request)) => {
                response.map_err(|_| hometown_ai::Error::Timeout(read_timeout))??
            }
        };
        tracing::debug!(session = %self.session_id, status = response.status, "response opened");

        let mut body = response.body.ok_or(hometown_ai::Error::StreamUnavailable)?;
        let mut framer = EventFramer::new();
        let mut server_error = false;

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Err(hometown_ai::Error::Aborted),
                next = tokio::time::timeout(read_timeout, body.next()) => {
                    next.map_err(|_| hometown_ai::Error::Timeout(read_timeout))?
                }
            };
            let Some(chunk) = next else { break };
            let chunk = chunk?;
            server_error |= self.apply_events(framer.push(&chunk), reply);
        }

        server_error |= self.apply_events(framer.finish(), reply);
        Ok(server_error)
    }

    /// Append framed events to the reply, publishing after each one.
    fn apply_events(&self, events: Vec<StreamEvent>, reply: &mut String) -> bool {
        let mut server_error = false;
        for event in events {
            match event {
                StreamEvent::Fragment(text) => {
                    reply.push_str(&text);
                    self.publish_reply(reply);
                    self.emit(ChatEvent::Fragment { text });
                }
                StreamEvent::ServerError => {
                    tracing::warn!(session = %self.session_id, "server reported an internal error");
                    let text = self.config.server_error_text.clone();
                    reply.push_str(&text);
                    self.publish_reply(reply);
                    self.emit(ChatEvent::ServerError { text });
                    server_error = true;
                }
            }
        }
        server_error
    }

    /// Replace the trailing assistant message with the accumulated reply
    fn publish_reply(&self, reply: &str) {
        self.state_tx.send_modify(|state| {
            state.replace_tail(reply);
        });
    }
}

/// Clears the loading flag when a send ends, including when its future is
/// dropped mid-stream.
struct LoadingGuard<'a> {
    state_tx: &'a watch::Sender<ConversationState>,
    handle: &'a ChatHandle,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state_tx.send_modify(|state| state.is_loading = false);
        self.handle.finish();
    }
}
