//! Streaming response types.
//!
//! A streamed call produces zero or more [`StreamItem::Chunk`] values followed
//! by exactly one [`StreamItem::Done`] carrying the settled message. A stream
//! that fails yields one `Err` and then ends without a `Done`.

use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::error::{ChatError, Result};
use crate::message::ChatMessage;

/// One item of a streamed chat response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    /// Incremental text, in arrival order.
    Chunk(String),
    /// The settled message. Always the last item of a successful stream.
    Done(ChatMessage),
}

impl StreamItem {
    /// Returns the text if this is a chunk.
    #[must_use]
    pub fn as_chunk(&self) -> Option<&str> {
        match self {
            Self::Chunk(text) => Some(text),
            Self::Done(_) => None,
        }
    }

    /// Returns `true` if this is the terminal item.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Boxed stream of chat response items.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamItem>> + Send>>;

/// Drain a stream, discarding chunks, and return the settled message.
pub async fn finalize(mut stream: ChatStream) -> Result<ChatMessage> {
    while let Some(item) = stream.next().await {
        if let StreamItem::Done(message) = item? {
            return Ok(message);
        }
    }
    Err(ChatError::stream("stream ended without a final message"))
}

/// Drain a stream and return every chunk together with the settled message.
pub async fn collect(mut stream: ChatStream) -> Result<(Vec<String>, ChatMessage)> {
    let mut chunks = Vec::new();
    while let Some(item) = stream.next().await {
        match item? {
            StreamItem::Chunk(chunk) => chunks.push(chunk),
            StreamItem::Done(message) => return Ok((chunks, message)),
        }
    }
    Err(ChatError::stream("stream ended without a final message"))
}
