//! Server-Sent-Events parsing.
//!
//! Layered leaf to root:
//! - [`decode`] turns body bytes into text without corrupting characters cut
//!   by chunk boundaries.
//! - [`frame`] splits text into blank-line-delimited events.
//! - [`event`] extracts data payloads and detects the end-of-stream sentinel.
//! - [`assembler`] drives the three over a live body.

pub mod assembler;
pub mod decode;
pub mod event;
pub mod frame;

pub use assembler::{StreamAssembler, assemble};
pub use decode::Utf8Decoder;
pub use event::{DONE_SENTINEL, EventOutcome, interpret_event, parse_data_line};
pub use frame::{EVENT_DELIMITER, FrameBuffer, SplitEvents, split_events};
