//! Configuration file support

use hometown_chat::ChatConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for hometown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gateway base URL, e.g. "http://localhost:8000"
    pub base_url: Option<String>,
    /// Chat endpoint path on the gateway
    pub endpoint_path: Option<String>,
    /// System message seeded into every conversation
    pub system_prompt: Option<String>,
    /// File holding the system message (used when `system_prompt` is unset)
    pub system_prompt_file: Option<String>,
    /// Seconds to wait for each chunk of a reply
    pub read_timeout_secs: Option<u64>,
    /// Seconds to wait for the connection
    pub connect_timeout_secs: Option<u64>,
    /// Localized texts shown in the conversation
    #[serde(default)]
    pub messages: Messages,
}

/// Localized conversation texts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub server_error: Option<String>,
    pub connection_failed: Option<String>,
}

/// Values given on the command line; they win over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub endpoint_path: Option<String>,
    pub system_prompt: Option<String>,
    pub read_timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hometown")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for HOMETOWN_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("HOMETOWN_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            base_url: Some("http://localhost:8000".to_string()),
            endpoint_path: Some(hometown_chat::config::DEFAULT_ENDPOINT_PATH.to_string()),
            ..Default::default()
        };

        default_config.save_to(&path)?;
        Ok(path)
    }

    /// Resolve the system prompt: inline text first, then the prompt file
    fn resolve_system_prompt(&self) -> Option<String> {
        if let Some(ref prompt) = self.system_prompt {
            return Some(prompt.clone());
        }
        let file = self.system_prompt_file.as_ref()?;
        match fs::read_to_string(file) {
            Ok(text) => Some(text.trim_end().to_string()),
            Err(e) => {
                tracing::warn!("Failed to read system prompt file {}: {}", file, e);
                None
            }
        }
    }

    /// Build the client config, CLI values taking precedence
    pub fn chat_config(&self, overrides: Overrides) -> ChatConfig {
        let mut config = ChatConfig::default();

        if let Some(url) = overrides.base_url.or_else(|| self.base_url.clone()) {
            config.base_url = url;
        }
        if let Some(path) = overrides.endpoint_path.or_else(|| self.endpoint_path.clone()) {
            config.endpoint_path = path;
        }
        config.system_prompt = overrides.system_prompt.or_else(|| self.resolve_system_prompt());
        if let Some(secs) = overrides.read_timeout_secs.or(self.read_timeout_secs) {
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(ref text) = self.messages.server_error {
            config.server_error_text = text.clone();
        }
        if let Some(ref text) = self.messages.connection_failed {
            config.connection_failed_text = text.clone();
        }

        config
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# hometown configuration file
# Place at ~/.config/hometown/config.toml (Linux/Mac) or %APPDATA%\hometown\config.toml (Windows)

# Gateway that proxies the chat endpoint
base_url = "http://localhost:8000"

# Streaming chat endpoint path
endpoint_path = "/api/chat"

# System message seeded into each conversation (optional)
# system_prompt = "You are a friendly mentor for newcomers to the town."
# system_prompt_file = "~/.config/hometown/system_prompt.txt"

# Seconds to wait for each chunk of a reply
read_timeout_secs = 60

# Seconds to wait for the connection
connect_timeout_secs = 10

# Texts shown in the conversation when something goes wrong
[messages]
# server_error = "서버 오류가 발생했습니다."
# connection_failed = "서버에 연결할 수 없습니다."
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.endpoint_path.as_deref(), Some("/api/chat"));
        assert_eq!(config.read_timeout_secs, Some(60));
        assert_eq!(config.messages, Messages::default());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = Config {
            base_url: Some("http://file:1".into()),
            endpoint_path: Some("/from/file".into()),
            system_prompt: Some("file prompt".into()),
            read_timeout_secs: Some(5),
            ..Default::default()
        };
        let chat = config.chat_config(Overrides {
            base_url: Some("http://cli:2".into()),
            system_prompt: Some("cli prompt".into()),
            ..Default::default()
        });
        assert_eq!(chat.base_url, "http://cli:2");
        assert_eq!(chat.endpoint_path, "/from/file");
        assert_eq!(chat.system_prompt.as_deref(), Some("cli prompt"));
        assert_eq!(chat.read_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_localized_texts_from_file() {
        let config: Config = toml::from_str(
            r#"
            [messages]
            server_error = "server error occurred"
            connection_failed = "could not connect"
            "#,
        )
        .unwrap();
        let chat = config.chat_config(Overrides::default());
        assert_eq!(chat.server_error_text, "server error occurred");
        assert_eq!(chat.connection_failed_text, "could not connect");
        assert_eq!(chat.base_url, ChatConfig::default().base_url);
    }

    #[test]
    fn test_missing_file_gives_default() {
        let config = Config::load_from(Path::new("/nonexistent/hometown/config.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("hometown-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let config = Config {
            base_url: Some("http://saved:9".into()),
            connect_timeout_secs: Some(3),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
        let _ = fs::remove_dir_all(dir);
    }
}
