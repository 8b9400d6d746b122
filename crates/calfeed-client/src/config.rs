//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calfeed/config.toml` by default. Command-line flags and
//! `CALFEED_*` environment variables override file values.

use std::path::{Path, PathBuf};

use calfeed_core::PastRetention;
use calfeed_providers::FetcherConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the calfeed client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL of the ICS feed.
    pub url: Option<String>,

    /// Number of past events to keep; `-1` keeps all of them.
    pub amount_of_past_events: PastRetention,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// User agent sent with feed requests.
    pub user_agent: Option<String>,

    /// Debug mode.
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: None,
            amount_of_past_events: PastRetention::Unbounded,
            timeout: FetcherConfig::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            debug: false,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calfeed")
    }

    /// Builds the fetcher configuration for `url` from these settings.
    pub fn fetcher_config(&self, url: impl Into<String>) -> FetcherConfig {
        let config = FetcherConfig::new(url)
            .with_past_retention(self.amount_of_past_events)
            .with_timeout(std::time::Duration::from_secs(self.timeout));

        match self.user_agent {
            Some(ref agent) => config.with_user_agent(agent.clone()),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = write_config("");
        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn reads_all_fields() {
        let file = write_config(
            r#"
url = "https://example.com/basic.ics"
amount_of_past_events = 5
timeout = 10
user_agent = "my-agent/1.0"
debug = true
"#,
        );

        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config.url.as_deref(), Some("https://example.com/basic.ics"));
        assert_eq!(config.amount_of_past_events, PastRetention::AtMost(5));
        assert_eq!(config.timeout, 10);
        assert_eq!(config.user_agent.as_deref(), Some("my-agent/1.0"));
        assert!(config.debug);
    }

    #[test]
    fn unbounded_retention_sentinel() {
        let file = write_config("amount_of_past_events = -1");
        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config.amount_of_past_events, PastRetention::Unbounded);
    }

    #[test]
    fn invalid_retention_is_a_config_error() {
        let file = write_config("amount_of_past_events = -3");
        let err = ClientConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("-3"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().starts_with("configuration error:"));
    }

    #[test]
    fn fetcher_config_carries_settings() {
        let config = ClientConfig {
            amount_of_past_events: PastRetention::AtMost(2),
            timeout: 7,
            user_agent: Some("agent".to_string()),
            ..Default::default()
        };

        let fetcher = config.fetcher_config("https://example.com/basic.ics");
        assert_eq!(fetcher.url, "https://example.com/basic.ics");
        assert_eq!(fetcher.past_retention, PastRetention::AtMost(2));
        assert_eq!(fetcher.timeout, std::time::Duration::from_secs(7));
        assert_eq!(fetcher.user_agent, "agent");
    }

    #[test]
    fn default_user_agent_is_kept() {
        let fetcher = ClientConfig::default().fetcher_config("x");
        assert!(fetcher.user_agent.starts_with("calfeed/"));
    }

    #[test]
    fn default_path_ends_with_config_toml() {
        let path = ClientConfig::default_path();
        assert!(path.ends_with("calfeed/config.toml"));
    }

    #[test]
    fn serializes_retention_as_integer() {
        let text = toml::to_string_pretty(&ClientConfig::default()).unwrap();
        assert!(text.contains("amount_of_past_events = -1"));
        assert!(!text.contains("url"));
    }
}
