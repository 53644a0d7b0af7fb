//! Reassembly of an SSE body into chunks and a settled message.

use async_stream::try_stream;
use futures::StreamExt;
use tracing::{debug, trace};

use crate::message::ChatMessage;
use crate::stream::{ChatStream, StreamItem};
use crate::transport::ByteStream;

use super::decode::Utf8Decoder;
use super::event::interpret_event;
use super::frame::FrameBuffer;

/// Synchronous core of the read loop.
///
/// Owns the decoder, the pending frame buffer and the running content for one
/// response. Once a terminal event has been seen every further input is
/// ignored.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    decoder: Utf8Decoder,
    frames: FrameBuffer,
    content: String,
    terminated: bool,
}

impl StreamAssembler {
    /// Create an assembler for a new response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw body bytes and return the chunks they completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        if self.terminated {
            return Vec::new();
        }
        let text = self.decoder.decode(bytes);
        let events = self.frames.push(&text);
        self.interpret_all(events)
    }

    /// Flush the decoder and parse whatever is still buffered as a last,
    /// possibly unterminated, event.
    pub fn finish(&mut self) -> Vec<String> {
        if self.terminated {
            return Vec::new();
        }
        let tail = self.decoder.finish();
        let events = self.frames.push(&tail);
        let mut chunks = self.interpret_all(events);

        if !self.terminated
            && let Some(rest) = self.frames.take_remainder()
        {
            debug!(bytes = rest.len(), "parsing unterminated trailing event");
            chunks.extend(self.interpret_all(vec![rest]));
        }
        chunks
    }

    fn interpret_all(&mut self, events: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        for event in events {
            let outcome = interpret_event(&event, &mut self.content);
            if let Some(chunk) = outcome.chunk {
                trace!(chunk = %chunk, "event chunk");
                chunks.push(chunk);
            }
            if outcome.terminal {
                debug!(content_len = self.content.len(), "received end-of-stream sentinel");
                self.terminated = true;
                break;
            }
        }
        chunks
    }

    /// Returns `true` once the sentinel has been seen.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Content accumulated so far.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Settle the accumulated content into an assistant message.
    #[must_use]
    pub fn into_message(self) -> ChatMessage {
        ChatMessage::assistant(self.content)
    }
}

/// Drive a body through the assembler.
///
/// Chunks are yielded as soon as their event completes. Reading stops at the
/// sentinel; if the body ends first, the buffered tail is parsed before the
/// final message is yielded. A body error ends the stream without a final
/// message. Dropping the stream stops reading.
#[must_use]
#[allow(tail_expr_drop_order)]
pub fn assemble(body: ByteStream) -> ChatStream {
    Box::pin(try_stream! {
        let mut body = body;
        let mut assembler = StreamAssembler::new();

        while let Some(bytes) = body.next().await {
            let bytes = bytes?;
            trace!(len = bytes.len(), "body chunk");
            for chunk in assembler.feed(&bytes) {
                yield StreamItem::Chunk(chunk);
            }
            if assembler.is_terminated() {
                break;
            }
        }

        for chunk in assembler.finish() {
            yield StreamItem::Chunk(chunk);
        }

        let message = assembler.into_message();
        debug!(id = %message.id, content_len = message.content.len(), "stream assembled");
        yield StreamItem::Done(message);
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use bytes::Bytes;
    use futures::stream;

    use super::*;
    use crate::error::{ChatError, Result};

    fn body_of(chunks: Vec<Vec<u8>>) -> ByteStream {
        let items: Vec<Result<Bytes>> = chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
        Box::pin(stream::iter(items))
    }

    fn text_body(chunks: &[&str]) -> ByteStream {
        body_of(chunks.iter().map(|c| c.as_bytes().to_vec()).collect())
    }

    async fn drain(stream: ChatStream) -> Vec<Result<StreamItem>> {
        stream.collect().await
    }

    mod stream_assembler {
        use super::*;

        #[test]
        fn feed_returns_completed_chunks() {
            let mut assembler = StreamAssembler::new();
            assert_eq!(assembler.feed(b"data: Hel"), Vec::<String>::new());
            assert_eq!(assembler.feed(b"lo\n\ndata: W"), vec!["Hello"]);
            assert_eq!(assembler.content(), "Hello");
        }

        #[test]
        fn input_after_sentinel_is_ignored() {
            let mut assembler = StreamAssembler::new();
            assembler.feed(b"data: A\n\ndata: [DONE]\n\ndata: B\n\n");
            assert!(assembler.is_terminated());
            assert!(assembler.feed(b"data: C\n\n").is_empty());
            assert!(assembler.finish().is_empty());
            assert_eq!(assembler.content(), "A");
        }

        #[test]
        fn finish_parses_trailing_data() {
            let mut assembler = StreamAssembler::new();
            assembler.feed(b"data: Complete event\n\ndata: Incomplete data line");
            assert_eq!(assembler.finish(), vec!["Incomplete data line"]);
            assert_eq!(assembler.content(), "Complete eventIncomplete data line");
        }

        #[test]
        fn finish_honors_trailing_sentinel() {
            let mut assembler = StreamAssembler::new();
            assembler.feed(b"data: A\n\ndata: [DONE]");
            assert!(assembler.finish().is_empty());
            assert!(assembler.is_terminated());
            assert_eq!(assembler.content(), "A");
        }

        #[test]
        fn finish_flushes_split_delimiter_from_decoder() {
            let mut assembler = StreamAssembler::new();
            assembler.feed(b"data: A\n");
            assert_eq!(assembler.finish(), vec!["A"]);
        }
    }

    mod assemble {
        use super::*;

        #[tokio::test]
        async fn full_stream_yields_chunks_then_done() {
            let items = drain(assemble(text_body(&[
                "data: Hello\n\ndata: World\n\ndata: [DONE]\n\n",
            ])))
            .await;

            assert_eq!(items.len(), 3);
            assert_eq!(items[0], Ok(StreamItem::Chunk("Hello".into())));
            assert_eq!(items[1], Ok(StreamItem::Chunk("World".into())));
            match &items[2] {
                Ok(StreamItem::Done(message)) => assert_eq!(message.content, "HelloWorld"),
                other => panic!("expected Done, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn trailing_incomplete_buffer_contributes() {
            let items = drain(assemble(text_body(&[
                "data: Complete event\n\n",
                "data: Incomplete data line",
            ])))
            .await;

            match items.last() {
                Some(Ok(StreamItem::Done(message))) => {
                    assert_eq!(message.content, "Complete eventIncomplete data line");
                }
                other => panic!("expected Done, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn chunks_survive_every_byte_split() {
            let source = "data: Grüße\n\ndata:data: 世界\n\ndata: [DONE]\n\n".as_bytes();
            for cut in 1..source.len() {
                let (a, b) = source.split_at(cut);
                let items = drain(assemble(body_of(vec![a.to_vec(), b.to_vec()]))).await;
                let chunks: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.as_ref().ok().and_then(StreamItem::as_chunk))
                    .collect();
                assert_eq!(chunks, vec!["Grüße", "世界"], "cut at {cut}");
            }
        }

        #[tokio::test]
        async fn stops_reading_after_sentinel() {
            let items: Vec<Result<Bytes>> = vec![
                Ok(Bytes::from_static(b"data: A\n\ndata: [DONE]\n\n")),
                Err(ChatError::stream("must not be polled")),
            ];
            let collected = drain(assemble(Box::pin(stream::iter(items)))).await;
            assert_eq!(collected.len(), 2);
            assert!(collected.iter().all(Result::is_ok));
            assert!(matches!(collected[1], Ok(StreamItem::Done(_))));
        }

        #[tokio::test]
        async fn body_error_ends_without_done() {
            let items: Vec<Result<Bytes>> = vec![
                Ok(Bytes::from_static(b"data: A\n\n")),
                Err(ChatError::network("connection reset")),
            ];
            let collected = drain(assemble(Box::pin(stream::iter(items)))).await;
            assert_eq!(collected.len(), 2);
            assert_eq!(collected[0], Ok(StreamItem::Chunk("A".into())));
            assert_eq!(collected[1], Err(ChatError::network("connection reset")));
        }

        #[tokio::test]
        async fn empty_body_settles_empty_message() {
            let items = drain(assemble(text_body(&[]))).await;
            assert_eq!(items.len(), 1);
            match &items[0] {
                Ok(StreamItem::Done(message)) => assert!(message.content.is_empty()),
                other => panic!("expected Done, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn heartbeat_events_yield_nothing() {
            let items = drain(assemble(text_body(&[": ping\n\nevent: noop\n\ndata: x\n\n"]))).await;
            assert_eq!(items.len(), 2);
            assert_eq!(items[0], Ok(StreamItem::Chunk("x".into())));
        }

        #[test]
        fn chunk_is_ready_before_body_ends() {
            use futures::channel::mpsc;

            let (tx, rx) = mpsc::unbounded::<Result<Bytes>>();
            let mut stream = tokio_test::task::spawn(assemble(Box::pin(rx)));

            assert!(stream.poll_next().is_pending());
            tx.unbounded_send(Ok(Bytes::from_static(b"data: first\n\n")))
                .unwrap();
            assert!(stream.is_woken());
            match stream.poll_next() {
                std::task::Poll::Ready(Some(Ok(StreamItem::Chunk(chunk)))) => {
                    assert_eq!(chunk, "first");
                }
                other => panic!("expected first chunk, got {other:?}"),
            }
            assert!(stream.poll_next().is_pending());
        }
    }
}
