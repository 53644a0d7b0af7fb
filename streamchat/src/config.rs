//! Chat client configuration.

use crate::error::{ChatError, Result};

/// Configuration for the chat client.
///
/// The base URL is the only addressing input. When it is empty the client
/// issues root-relative requests (`/chat?...`) and leaves resolution to the
/// transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base URL without trailing slash. May be empty.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ChatConfig {
    /// Environment variable holding the base URL.
    pub const ENV_BASE_URL: &'static str = "STREAMCHAT_API_URL";
    /// Environment variable holding the request timeout.
    pub const ENV_TIMEOUT_SECS: &'static str = "STREAMCHAT_TIMEOUT_SECS";
    /// Path of the chat endpoint relative to the base URL.
    pub const CHAT_PATH: &'static str = "/chat";

    /// Creates a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.as_ref()),
            timeout_secs: None,
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `STREAMCHAT_API_URL` - Optional base URL (absent means root-relative)
    /// - `STREAMCHAT_TIMEOUT_SECS` - Optional timeout in seconds
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(Self::ENV_BASE_URL).unwrap_or_default();

        let timeout_secs = match lookup(Self::ENV_TIMEOUT_SECS) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                ChatError::config(format!("{}={raw:?}: {e}", Self::ENV_TIMEOUT_SECS))
            })?),
            None => None,
        };

        Ok(Self {
            base_url: normalize_base_url(&base_url),
            timeout_secs,
        })
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(url.as_ref());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Returns `true` when requests are issued as root-relative paths.
    #[must_use]
    pub fn is_root_relative(&self) -> bool {
        self.base_url.is_empty()
    }

    /// Build the chat URL for a question.
    #[must_use]
    pub fn chat_url(&self, question: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(question.as_bytes()).collect();
        format!("{}{}?question={encoded}", self.base_url, Self::CHAT_PATH)
    }
}

/// Trim whitespace and a single trailing slash from a base URL.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).trim().to_owned()
}
