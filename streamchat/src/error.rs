//! Error types for chat client operations.
//!
//! [`ChatError`] covers every way a chat call can fail before or while the
//! response is delivered: the transport, the remote status, the byte stream
//! itself, and invalid configuration. Decode failures of a structured body
//! are never surfaced here; they are recovered by the normalizer.

/// Result type alias for streamchat operations.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Error type for chat client operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ChatError {
    /// Network or connection error.
    #[error("{0}")]
    Network(String),

    /// The remote endpoint answered with a non-success status.
    #[error("Chat API responded with {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// The response body failed while it was being read.
    #[error("Stream error: {0}")]
    Stream(String),

    /// A request URL could not be built or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The message to send was empty or whitespace only.
    #[error("Cannot send an empty message")]
    EmptyMessage,

    /// Internal error.
    #[error("{0}")]
    Internal(String),
}

impl ChatError {
    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a streaming error.
    #[must_use]
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    /// Create an invalid URL error.
    #[must_use]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl(message.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is a retryable error.
    ///
    /// The client itself never retries; this is a hint for callers that
    /// implement their own policy.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else if err.is_body() || err.is_decode() {
            Self::stream(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ChatError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod http_status {
        use super::*;

        #[test]
        fn message_contains_numeric_status() {
            let err = ChatError::http_status(500, "Internal Server Error");
            assert!(err.to_string().contains("500"));
        }

        #[test]
        fn status_accessor_returns_code() {
            assert_eq!(ChatError::http_status(404, "").status(), Some(404));
            assert_eq!(ChatError::network("down").status(), None);
        }

        #[test]
        fn body_is_kept_out_of_display() {
            let err = ChatError::http_status(502, "<html>bad gateway</html>");
            assert_eq!(err.to_string(), "Chat API responded with 502");
        }
    }

    mod retryable {
        use super::*;

        #[test]
        fn only_network_errors_are_retryable() {
            assert!(ChatError::network("reset").is_retryable());
            assert!(!ChatError::http_status(503, "").is_retryable());
            assert!(!ChatError::stream("eof").is_retryable());
            assert!(!ChatError::EmptyMessage.is_retryable());
        }
    }

    #[test]
    fn url_parse_error_converts_to_invalid_url() {
        let err: ChatError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ChatError::InvalidUrl(_)));
    }
}
