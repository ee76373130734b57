//! Client configuration

use std::time::Duration;

use hometown_ai::transport::join_url;

use crate::error::{Error, Result};

/// Endpoint path the chat gateway serves
pub const DEFAULT_ENDPOINT_PATH: &str = "/api/chat";

/// Appended to the reply when the server reports an internal error
pub const DEFAULT_SERVER_ERROR_TEXT: &str = "서버 오류가 발생했습니다.";

/// Replaces the reply when the server can't be reached
pub const DEFAULT_CONNECTION_FAILED_TEXT: &str = "서버에 연결할 수 없습니다.";

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`StreamingChatClient`](crate::StreamingChatClient)
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Scheme and host of the gateway, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Path of the streaming chat endpoint
    pub endpoint_path: String,
    /// Optional system message seeded at the start of every conversation
    pub system_prompt: Option<String>,
    /// Longest wait for the response, and then for each chunk of the reply
    pub read_timeout: Duration,
    /// Longest wait for the TCP connection
    pub connect_timeout: Duration,
    /// Localized text for the server-error sentinel
    pub server_error_text: String,
    /// Localized text for connection failures
    pub connection_failed_text: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            system_prompt: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            server_error_text: DEFAULT_SERVER_ERROR_TEXT.to_string(),
            connection_failed_text: DEFAULT_CONNECTION_FAILED_TEXT.to_string(),
        }
    }
}

impl ChatConfig {
    /// Create a config for the given gateway with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the seed system message
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the per-read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Full URL of the chat endpoint
    pub fn endpoint_url(&self) -> String {
        join_url(&self.base_url, &self.endpoint_path)
    }

    /// Check the config before building a transport from it
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("base_url is empty".into()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "base_url must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        if !self.endpoint_path.starts_with('/') {
            return Err(Error::InvalidConfig(format!(
                "endpoint_path must start with '/', got {}",
                self.endpoint_path
            )));
        }
        if self.read_timeout.is_zero() {
            return Err(Error::InvalidConfig("read_timeout must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_url() {
        let config = ChatConfig::default();
        assert_eq!(config.endpoint_url(), "http://localhost:8000/api/chat");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        assert!(ChatConfig::new("").validate().is_err());
        assert!(ChatConfig::new("localhost:8000").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_path() {
        let config = ChatConfig {
            endpoint_path: "api/chat".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("endpoint_path"), "got: {}", err);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ChatConfig::default().with_read_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
