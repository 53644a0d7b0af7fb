//! Conversation state over a [`ChatService`].
//!
//! [`ChatSession`] keeps the transcript and the single streaming slot: at most
//! one assistant message has `is_streaming = true` at any time. `&mut self`
//! on [`ChatSession::send_message`] keeps calls from overlapping.

use futures::StreamExt;
use tracing::{debug, warn};

use crate::client::ChatService;
use crate::error::{ChatError, Result};
use crate::message::ChatMessage;
use crate::stream::StreamItem;

/// Transcript plus the in-progress assistant message, if any.
#[derive(Debug)]
pub struct ChatSession<S> {
    service: S,
    messages: Vec<ChatMessage>,
    streaming_id: Option<String>,
    loading: bool,
}

impl<S: ChatService> ChatSession<S> {
    /// Create an empty session.
    #[must_use]
    pub const fn new(service: S) -> Self {
        Self {
            service,
            messages: Vec::new(),
            streaming_id: None,
            loading: false,
        }
    }

    /// The transcript, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Identifier of the assistant message still receiving chunks.
    #[must_use]
    pub fn streaming_id(&self) -> Option<&str> {
        self.streaming_id.as_deref()
    }

    /// Returns `true` while a call is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The underlying service.
    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Drop the transcript.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.streaming_id = None;
    }

    /// Send `text` and stream the reply into the transcript.
    ///
    /// `on_update` sees the user message once, then the assistant message
    /// after every chunk and once more when it settles.
    ///
    /// If the call fails, or its future is dropped, the partial assistant
    /// message is removed and the user message stays.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::EmptyMessage`] for blank input without touching
    /// the transcript, and otherwise whatever the service or its stream
    /// reports.
    pub async fn send_message<F>(&mut self, text: &str, mut on_update: F) -> Result<ChatMessage>
    where
        F: FnMut(&ChatMessage) + Send,
    {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let Self {
            service,
            messages,
            streaming_id,
            loading,
        } = self;

        let user = ChatMessage::user(text);
        on_update(&user);
        messages.push(user);

        let mut in_flight = InFlight::begin(messages, streaming_id, loading);
        let mut stream = service.send_stream(text).await?;

        while let Some(item) = stream.next().await {
            let item = item.inspect_err(|e| warn!(error = %e, "chat stream failed"))?;
            let message = in_flight.assistant();
            match item {
                StreamItem::Chunk(chunk) => {
                    message.content.push_str(&chunk);
                    on_update(message);
                }
                StreamItem::Done(settled) => {
                    message.content = settled.content;
                    message.id = settled.id;
                    message.timestamp = settled.timestamp;
                    message.is_streaming = false;
                    let message = message.clone();
                    in_flight.settle();
                    debug!(id = %message.id, content_len = message.content.len(), "assistant message settled");
                    on_update(&message);
                    return Ok(message);
                }
            }
        }
        Err(ChatError::stream("stream ended without a final message"))
    }
}

/// Borrow of the session state for one outstanding call.
///
/// Dropping it unsettled removes the partial assistant message and clears
/// the slot; dropping it always clears the loading flag.
struct InFlight<'a> {
    messages: &'a mut Vec<ChatMessage>,
    streaming_id: &'a mut Option<String>,
    loading: &'a mut bool,
    index: Option<usize>,
}

impl<'a> InFlight<'a> {
    fn begin(
        messages: &'a mut Vec<ChatMessage>,
        streaming_id: &'a mut Option<String>,
        loading: &'a mut bool,
    ) -> Self {
        *loading = true;
        Self {
            messages,
            streaming_id,
            loading,
            index: None,
        }
    }

    /// The in-progress assistant message, created on first use.
    fn assistant(&mut self) -> &mut ChatMessage {
        let index = match self.index {
            Some(index) => index,
            None => {
                let message = ChatMessage::streaming_assistant();
                *self.streaming_id = Some(message.id.clone());
                self.messages.push(message);
                let index = self.messages.len() - 1;
                self.index = Some(index);
                index
            }
        };
        &mut self.messages[index]
    }

    fn settle(&mut self) {
        self.index = None;
        *self.streaming_id = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(index) = self.index.take() {
            debug!("discarding unsettled assistant message");
            self.messages.remove(index);
        }
        *self.streaming_id = None;
        *self.loading = false;
    }
}
