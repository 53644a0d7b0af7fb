//! Selection of a response handling strategy from the declared content type.

/// Body shape declared by a response's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// A single structured JSON document.
    Json,
    /// An incremental Server-Sent-Events stream.
    EventStream,
    /// Anything else, including a missing header.
    Text,
}

impl ResponseKind {
    /// Classify a `Content-Type` header value.
    ///
    /// Matching is case-insensitive and ignores parameters such as `charset`.
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(raw) = content_type else {
            return Self::Text;
        };
        let lowered = raw.to_ascii_lowercase();
        let mime = lowered.split(';').next().unwrap_or_default().trim();

        if mime == "application/json" || mime.ends_with("+json") {
            Self::Json
        } else if mime.contains("event-stream") {
            Self::EventStream
        } else {
            Self::Text
        }
    }
}

/// How a response is turned into chunks and a settled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Read the whole body and normalize it as a structured document.
    NormalizeDocument,
    /// Reassemble SSE events; `emit_chunks` is false for one-shot calls.
    AssembleEvents {
        /// Whether chunks are surfaced to the caller.
        emit_chunks: bool,
    },
    /// Read the whole body as the text of a single assistant message.
    RawText,
}

impl Strategy {
    /// Pick the strategy for a response.
    #[must_use]
    pub const fn select(kind: ResponseKind, streaming: bool) -> Self {
        match kind {
            ResponseKind::Json => Self::NormalizeDocument,
            ResponseKind::EventStream => Self::AssembleEvents {
                emit_chunks: streaming,
            },
            ResponseKind::Text => Self::RawText,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod response_kind {
        use super::*;

        #[test]
        fn json_types() {
            for ct in [
                "application/json",
                "application/json; charset=utf-8",
                "Application/JSON",
                "application/problem+json",
            ] {
                assert_eq!(ResponseKind::from_content_type(Some(ct)), ResponseKind::Json, "{ct}");
            }
        }

        #[test]
        fn event_stream_types() {
            for ct in ["text/event-stream", "text/event-stream;charset=UTF-8", "TEXT/EVENT-STREAM"] {
                assert_eq!(
                    ResponseKind::from_content_type(Some(ct)),
                    ResponseKind::EventStream,
                    "{ct}"
                );
            }
        }

        #[test]
        fn everything_else_is_text() {
            assert_eq!(ResponseKind::from_content_type(None), ResponseKind::Text);
            for ct in ["", "text/plain", "text/html; charset=utf-8", "application/xml"] {
                assert_eq!(ResponseKind::from_content_type(Some(ct)), ResponseKind::Text, "{ct}");
            }
        }
    }

    mod strategy {
        use super::*;

        #[test]
        fn select_by_kind() {
            assert_eq!(
                Strategy::select(ResponseKind::Json, true),
                Strategy::NormalizeDocument
            );
            assert_eq!(Strategy::select(ResponseKind::Text, true), Strategy::RawText);
        }

        #[test]
        fn event_stream_emits_only_when_streaming() {
            assert_eq!(
                Strategy::select(ResponseKind::EventStream, true),
                Strategy::AssembleEvents { emit_chunks: true }
            );
            assert_eq!(
                Strategy::select(ResponseKind::EventStream, false),
                Strategy::AssembleEvents { emit_chunks: false }
            );
        }
    }
}
