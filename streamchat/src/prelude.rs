//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use streamchat::prelude::*;
//! ```

pub use crate::classify::{ResponseKind, Strategy};
pub use crate::client::{ChatClient, ChatService};
pub use crate::config::ChatConfig;
pub use crate::error::{ChatError, Result};
pub use crate::message::{ChatMessage, Role};
pub use crate::normalize::{normalize_body, normalize_value};
pub use crate::session::ChatSession;
pub use crate::sse::{StreamAssembler, assemble};
pub use crate::stream::{ChatStream, StreamItem, collect, finalize};
pub use crate::transport::{
    ACCEPT_HEADER, ByteStream, HttpTransport, Transport, TransportRequest, TransportResponse,
};
