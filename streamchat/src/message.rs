//! Chat message types.
//!
//! A [`ChatMessage`] is both the unit of a conversation transcript and the
//! settled result of a chat call. Identifiers are generated locally and are
//! ordered by generation time.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by the user.
    User,
    /// Message produced by the remote chat endpoint.
    #[default]
    Assistant,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse a role name, ignoring ASCII case. Unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("user") {
            Some(Self::User)
        } else if name.eq_ignore_ascii_case("assistant") {
            Some(Self::Assistant)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier, ordered by generation time.
    pub id: String,
    /// Who authored the message.
    pub role: Role,
    /// Message text. Only grows while `is_streaming` is set.
    pub content: String,
    /// When the message was created or, for settled results, reported.
    pub timestamp: DateTime<Utc>,
    /// True only while an assistant message is still receiving chunks.
    #[serde(default)]
    pub is_streaming: bool,
}

impl ChatMessage {
    /// Create a message with a fresh identifier and the current time.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            is_streaming: false,
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a settled assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an empty assistant message that is still receiving chunks.
    #[must_use]
    pub fn streaming_assistant() -> Self {
        Self {
            is_streaming: true,
            ..Self::assistant(String::new())
        }
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Global counter for unique ID generation.
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique message ID.
///
/// The microsecond timestamp keeps IDs time-ordered; the counter keeps them
/// unique when two are generated within the same microsecond.
#[must_use]
pub fn generate_message_id() -> String {
    let micros = Utc::now().timestamp_micros().max(0);
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("msg_{micros:x}_{counter:04x}")
}
