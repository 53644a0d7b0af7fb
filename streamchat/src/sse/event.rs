//! Interpretation of a single SSE event.

/// Payload that marks the end of the stream. Never part of visible content.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_PREFIX: &str = "data:";
/// Prefix emitted twice by some relays (`data:data: payload`).
const DOUBLED_DATA_PREFIX: &str = "data:data:";

/// What a single event contributed to the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// The event carried the sentinel; nothing after it may be read.
    pub terminal: bool,
    /// Text appended to the accumulation by this event, if any.
    pub chunk: Option<String>,
}

impl EventOutcome {
    /// Returns `true` if the event neither ended the stream nor added text.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        !self.terminal && self.chunk.is_none()
    }
}

/// Extract the payload of a data line.
///
/// Both `data:` and the doubled `data:data:` form are recognized. Exactly one
/// space after the prefix is stripped. Any other line yields `None`.
#[must_use]
pub fn parse_data_line(line: &str) -> Option<&str> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let rest = line
        .strip_prefix(DOUBLED_DATA_PREFIX)
        .or_else(|| line.strip_prefix(DATA_PREFIX))?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Interpret one raw event and fold it into `accumulated`.
///
/// Data lines are joined with `\n` and appended as one chunk. A data line
/// whose trimmed payload is the sentinel makes the event terminal; data lines
/// before it in the same event are still appended, lines after it are not
/// read. Non-data lines are ignored.
pub fn interpret_event(event: &str, accumulated: &mut String) -> EventOutcome {
    let mut payloads = Vec::new();
    let mut terminal = false;

    for data in event.split('\n').filter_map(parse_data_line) {
        if data.trim() == DONE_SENTINEL {
            terminal = true;
            break;
        }
        payloads.push(data);
    }

    let joined = payloads.join("\n");
    if joined.is_empty() {
        return EventOutcome {
            terminal,
            chunk: None,
        };
    }

    accumulated.push_str(&joined);
    EventOutcome {
        terminal,
        chunk: Some(joined),
    }
}
