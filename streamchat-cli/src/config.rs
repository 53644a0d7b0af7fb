//! Configuration file for the command-line client.
//!
//! Settings are layered:
//! 1. Config file (`~/.streamchat/config.toml`, or `--config`)
//! 2. Environment variables and command-line flags

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use streamchat::ChatConfig;
use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Base URL of the chat endpoint. Empty means root-relative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Origin used to resolve root-relative URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Apply overrides; `Some` values win.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            base_url: overrides.base_url.or(self.base_url),
            origin: overrides.origin.or(self.origin),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Build the client configuration.
    #[must_use]
    pub fn chat_config(&self) -> ChatConfig {
        let config = ChatConfig::new(self.base_url.as_deref().unwrap_or_default());
        match self.timeout_secs {
            Some(secs) => config.with_timeout(secs),
            None => config,
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".streamchat")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a specific path. A missing file yields defaults.
pub async fn load_config_from(path: &Path) -> ConfigResult<FileConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(FileConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: FileConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert!(default_config_dir().ends_with(".streamchat"));
        assert!(config_path().ends_with("config.toml"));
    }

    #[test]
    fn test_parse_file() {
        let config: FileConfig = toml::from_str(
            r#"
            base_url = "http://localhost:8000/"
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8000/"));
        assert_eq!(config.timeout_secs, Some(30));
        assert!(config.origin.is_none());

        let chat = config.chat_config();
        assert_eq!(chat.base_url, "http://localhost:8000");
        assert_eq!(chat.timeout_secs, Some(30));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(toml::from_str::<FileConfig>("model = \"x\"").is_err());
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = FileConfig {
            base_url: Some("http://file".into()),
            origin: Some("http://origin".into()),
            timeout_secs: Some(5),
        };
        let merged = file.merge(FileConfig {
            base_url: Some("http://flag".into()),
            ..FileConfig::default()
        });
        assert_eq!(merged.base_url.as_deref(), Some("http://flag"));
        assert_eq!(merged.origin.as_deref(), Some("http://origin"));
        assert_eq!(merged.timeout_secs, Some(5));
    }

    #[test]
    fn test_empty_config_is_root_relative() {
        assert!(FileConfig::default().chat_config().is_root_relative());
        assert_eq!(FileConfig::default().to_toml().unwrap(), "");
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("streamchat-missing-config.toml");
        let config = load_config_from(&path).await.unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[tokio::test]
    async fn test_load_file() {
        let path = std::env::temp_dir().join(format!(
            "streamchat-config-{}.toml",
            std::process::id()
        ));
        tokio::fs::write(&path, "origin = \"http://localhost:3000\"\n")
            .await
            .unwrap();
        let config = load_config_from(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();
        assert_eq!(config.origin.as_deref(), Some("http://localhost:3000"));
    }
}
