//! Transport seam: send a chat request, get back a readable byte stream

use std::{pin::Pin, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{StatusCode, header};

use crate::{
    error::{Error, Result},
    types::ChatRequest,
};

/// A response body as a stream of raw chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// An opened response
pub struct ChatResponse {
    /// HTTP status code (or equivalent for non-HTTP transports)
    pub status: u16,
    /// Body stream; `None` when the response has nothing readable
    pub body: Option<ByteStream>,
}

impl ChatResponse {
    /// Create a successful response around a body stream
    pub fn streaming(body: ByteStream) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    /// Create a response with no readable body
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }
}

impl std::fmt::Debug for ChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatResponse")
            .field("status", &self.status)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

/// Capability to send a chat request and open its response stream
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// POST the request and return the opened response
    async fn open(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// Join a base URL and an endpoint path without doubling the slash
pub fn join_url(base_url: &str, endpoint_path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint_path.trim_start_matches('/')
    )
}

/// HTTP transport backed by reqwest
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Create a transport posting to `url`
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self::with_client(client, url))
    }

    /// Create a transport from an existing client
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// The endpoint this transport posts to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ChatResponse> {
        tracing::debug!(url = %self.url, messages = request.messages.len(), "posting chat request");

        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::status(status.as_u16(), body));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(ChatResponse::empty(status.as_u16()));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(Error::from));

        Ok(ChatResponse {
            status: status.as_u16(),
            body: Some(Box::pin(body)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8000", "/api/chat"),
            "http://localhost:8000/api/chat"
        );
        assert_eq!(
            join_url("http://localhost:8000/", "/api/chat"),
            "http://localhost:8000/api/chat"
        );
        assert_eq!(join_url("http://h", "api/chat"), "http://h/api/chat");
    }

    #[test]
    fn test_http_transport_url() {
        let t = HttpTransport::with_client(reqwest::Client::new(), "http://h/api/chat");
        assert_eq!(t.url(), "http://h/api/chat");
    }

    #[test]
    fn test_empty_response_debug() {
        let r = ChatResponse::empty(204);
        assert!(r.body.is_none());
        assert!(format!("{:?}", r).contains("204"));
    }
}
