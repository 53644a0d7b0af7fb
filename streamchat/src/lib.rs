//! Streamchat - a streaming chat-response client
//!
//! This crate sends a question to a chat endpoint and turns whatever comes
//! back (a Server-Sent-Events stream, a JSON document or plain text) into
//! incremental text chunks and one settled [`ChatMessage`].

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod normalize;
pub mod prelude;
pub mod session;
pub mod sse;
pub mod stream;
pub mod tee;
pub mod transport;

pub use client::{ChatClient, ChatService};
pub use config::ChatConfig;
pub use error::{ChatError, Result};
pub use message::{ChatMessage, Role};
pub use session::ChatSession;
pub use stream::{ChatStream, StreamItem};
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
