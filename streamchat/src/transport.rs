//! Transport abstraction and the reqwest-backed implementation.
//!
//! The chat client never fetches bytes itself. It hands a [`TransportRequest`]
//! to an injected [`Transport`] and receives a status, a declared content type
//! and a byte stream.

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::config::ChatConfig;
use crate::error::{ChatError, Result};
use crate::sse::Utf8Decoder;

/// Accept header: event stream first, then JSON, then anything.
pub const ACCEPT_HEADER: &str = "text/event-stream, application/json;q=0.9, */*;q=0.8";

/// Boxed stream of raw body bytes.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A `GET` request for the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Absolute or root-relative URL.
    pub url: String,
    /// Value of the `Accept` header.
    pub accept: &'static str,
}

impl TransportRequest {
    /// Create a request with the default accept header.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            accept: ACCEPT_HEADER,
        }
    }
}

/// A response whose body has not been read yet.
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Declared content type, if any.
    pub content_type: Option<String>,
    /// Body bytes, in arrival order.
    pub body: ByteStream,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl TransportResponse {
    /// Create a response.
    #[must_use]
    pub fn new(status: u16, content_type: Option<String>, body: ByteStream) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Read the whole body.
    pub async fn bytes(self) -> Result<Bytes> {
        collect_body(self.body).await
    }

    /// Read the whole body as text, replacing invalid UTF-8.
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        let mut decoder = Utf8Decoder::new();
        let mut text = decoder.decode(&bytes);
        text.push_str(&decoder.finish());
        Ok(text)
    }
}

/// Concatenate every chunk of a body.
pub async fn collect_body(mut body: ByteStream) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

/// Source of chat responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request. Non-success statuses are returned, not raised.
    async fn get(&self, request: &TransportRequest) -> Result<TransportResponse>;
}

/// HTTP transport backed by `reqwest`.
///
/// Root-relative URLs are resolved against `origin`; without one they are
/// rejected with [`ChatError::InvalidUrl`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    origin: Option<Url>,
}

impl HttpTransport {
    /// Create a transport honoring the timeout in `config`.
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| ChatError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            origin: None,
        })
    }

    /// Create a transport around an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
            origin: None,
        }
    }

    /// Set the origin used to resolve root-relative URLs.
    pub fn with_origin(mut self, origin: &str) -> Result<Self> {
        self.origin = Some(Url::parse(origin)?);
        Ok(self)
    }

    /// Resolve a request URL to an absolute one.
    pub fn resolve(&self, url: &str) -> Result<Url> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.origin {
                Some(origin) => Ok(origin.join(url)?),
                None => Err(ChatError::invalid_url(format!(
                    "{url} is root-relative and no origin is configured"
                ))),
            },
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let url = self.resolve(&request.url)?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, request.accept)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ChatError::from));

        Ok(TransportResponse::new(status, content_type, Box::pin(body)))
    }
}
