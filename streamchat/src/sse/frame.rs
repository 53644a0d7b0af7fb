//! Event framing on blank-line delimiters.

/// Boundary between two events.
pub const EVENT_DELIMITER: &str = "\n\n";

/// Complete events found in a buffer plus the unconsumed tail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitEvents {
    /// Complete events in arrival order, delimiters removed.
    pub events: Vec<String>,
    /// Text after the last delimiter; possibly a partial event.
    pub remainder: String,
}

/// Split `pending + incoming` into complete events and a remainder.
///
/// Events are extracted greedily left to right. Calling this with an empty
/// `incoming` on an already-split remainder yields no events and returns the
/// remainder unchanged.
#[must_use]
pub fn split_events(pending: &str, incoming: &str) -> SplitEvents {
    let mut buffer = FrameBuffer::with_pending(pending);
    let events = buffer.push(incoming);
    SplitEvents {
        events,
        remainder: buffer.pending,
    }
}

/// Incremental SSE frame buffer.
///
/// Buffers decoded text and emits complete events; an incomplete trailing
/// event is held back until its delimiter arrives.
#[derive(Debug, Default, Clone)]
pub struct FrameBuffer {
    pending: String,
}

impl FrameBuffer {
    /// Create an empty frame buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_pending(pending: &str) -> Self {
        Self {
            pending: pending.to_owned(),
        }
    }

    /// Feed decoded text and return any complete events.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.pending.push_str(text);

        let mut events = Vec::new();
        let mut consumed = 0;
        while let Some(pos) = self.pending[consumed..].find(EVENT_DELIMITER) {
            let end = consumed + pos;
            events.push(self.pending[consumed..end].to_owned());
            consumed = end + EVENT_DELIMITER.len();
        }

        if consumed > 0 {
            self.pending.drain(..consumed);
        }
        events
    }

    /// The unconsumed tail.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Check if there's pending data in the buffer.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take the unconsumed tail, leaving the buffer empty.
    ///
    /// Returns `None` if nothing is pending.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}
