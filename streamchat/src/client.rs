//! Chat client facade.
//!
//! [`ChatClient`] issues one `GET <base>/chat?question=...` per call through
//! an injected [`Transport`] and settles the response into a [`ChatMessage`]:
//!
//! - [`ChatClient::send`] resolves the settled message only.
//! - [`ChatClient::send_stream`] yields chunks as they are produced, then the
//!   settled message.
//!
//! Both calls classify the response by content type, so for the same canned
//! response they settle to the same content.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use bytes::BytesMut;
use futures::{StreamExt, future};
use tracing::{debug, info, warn};

use crate::classify::{ResponseKind, Strategy};
use crate::config::ChatConfig;
use crate::error::{ChatError, Result};
use crate::message::ChatMessage;
use crate::normalize::normalize_body;
use crate::sse::assemble;
use crate::stream::{ChatStream, StreamItem, finalize};
use crate::tee::tee_body;
use crate::transport::{
    ByteStream, HttpTransport, Transport, TransportRequest, TransportResponse, collect_body,
};

/// Most bytes of an error body kept for diagnostics.
const ERROR_BODY_LIMIT: usize = 4096;
/// How long an error body may take to arrive before it is cut short.
const ERROR_BODY_WAIT: Duration = Duration::from_secs(1);

/// A chat backend that can answer one question at a time.
///
/// Implemented by [`ChatClient`]; sessions and tests depend on this trait
/// rather than on the concrete client.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send a message and resolve the settled reply.
    async fn send(&self, text: &str) -> Result<ChatMessage>;

    /// Send a message and stream the reply.
    ///
    /// Errors before the body is read (transport failure, non-success
    /// status) are returned directly; later failures arrive as an `Err`
    /// item that ends the stream.
    async fn send_stream(&self, text: &str) -> Result<ChatStream>;
}

/// Chat client bound to a configuration and a transport.
#[derive(Clone)]
pub struct ChatClient {
    config: Arc<ChatConfig>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a client with an explicit transport.
    #[must_use]
    pub fn new(config: ChatConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    /// Create a client over HTTP with `reqwest`.
    pub fn http(config: ChatConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, transport))
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Issue the request and reject non-success statuses.
    async fn dispatch(&self, text: &str) -> Result<TransportResponse> {
        let request = TransportRequest::get(self.config.chat_url(text));
        info!(url = %request.url, "dispatching chat request");

        let response = self.transport.get(&request).await.inspect_err(|e| {
            warn!(url = %request.url, error = %e, "chat request failed");
        })?;

        if !response.is_success() {
            let status = response.status;
            let body = error_body(response.body).await;
            warn!(url = %request.url, status, body = %body, "chat endpoint returned an error status");
            return Err(ChatError::http_status(status, body));
        }

        debug!(
            status = response.status,
            content_type = response.content_type.as_deref().unwrap_or(""),
            "chat response received"
        );
        Ok(response)
    }

    fn strategy(response: &TransportResponse, streaming: bool) -> Strategy {
        let kind = ResponseKind::from_content_type(response.content_type.as_deref());
        let strategy = Strategy::select(kind, streaming);
        debug!(?kind, ?strategy, "selected response strategy");
        strategy
    }

    /// Turn a successful response into items following its strategy.
    fn respond(response: TransportResponse, streaming: bool) -> ChatStream {
        let strategy = Self::strategy(&response, streaming);
        let body = if streaming {
            tee_body(response.body)
        } else {
            response.body
        };

        match strategy {
            Strategy::AssembleEvents { emit_chunks: true } => assemble(body),
            Strategy::AssembleEvents { emit_chunks: false } => settled_only(assemble(body)),
            Strategy::NormalizeDocument => single_shot(body, normalize_body),
            Strategy::RawText => single_shot(body, |bytes| {
                ChatMessage::assistant(String::from_utf8_lossy(bytes).into_owned())
            }),
        }
    }
}

#[async_trait]
impl ChatService for ChatClient {
    async fn send(&self, text: &str) -> Result<ChatMessage> {
        let response = self.dispatch(text).await?;
        let message = finalize(Self::respond(response, false)).await?;

        debug!(id = %message.id, content_len = message.content.len(), "chat response settled");
        Ok(message)
    }

    async fn send_stream(&self, text: &str) -> Result<ChatStream> {
        let response = self.dispatch(text).await?;
        Ok(Self::respond(response, true))
    }
}

/// Read the start of an error body without waiting on a body that never ends.
async fn error_body(mut body: ByteStream) -> String {
    let mut buf = BytesMut::new();
    let read = async {
        while buf.len() < ERROR_BODY_LIMIT {
            match body.next().await {
                Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    debug!(error = %e, "error body failed");
                    break;
                }
                None => break,
            }
        }
    };
    if tokio::time::timeout(ERROR_BODY_WAIT, read).await.is_err() {
        debug!(read = buf.len(), "error body still open, cutting it short");
    }
    buf.truncate(ERROR_BODY_LIMIT);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Drop chunks and keep only the settled message (and any error).
fn settled_only(stream: ChatStream) -> ChatStream {
    Box::pin(stream.filter(|item| future::ready(!matches!(item, Ok(StreamItem::Chunk(_))))))
}

/// Read a whole body, then yield its content as one chunk (when non-empty)
/// followed by the settled message.
// `try_stream!` expands to a tail expression that trips `tail_expr_drop_order`
// under Rust 2024; the generated temporaries hold no resources.
#[allow(tail_expr_drop_order)]
fn single_shot<F>(body: ByteStream, settle: F) -> ChatStream
where
    F: FnOnce(&[u8]) -> ChatMessage + Send + 'static,
{
    Box::pin(try_stream! {
        let bytes = collect_body(body).await?;
        let message = settle(&bytes);
        if !message.content.is_empty() {
            yield StreamItem::Chunk(message.content.clone());
        }
        yield StreamItem::Done(message);
    })
}
