//! Error type for the command-line client.

use streamchat::ChatError;

use crate::config::ConfigError;

/// Error type for CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The chat call failed.
    #[error(transparent)]
    Chat(#[from] ChatError),
    /// The configuration file could not be used.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Terminal IO failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A message could not be rendered as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
