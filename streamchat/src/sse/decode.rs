//! Incremental UTF-8 decoding across chunk seams.

/// Streaming UTF-8 decoder.
///
/// Bytes of a multi-byte character that is cut by a chunk boundary are held
/// back until the rest arrives. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default, Clone)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, holding back an incomplete trailing sequence.
    pub fn decode(&mut self, input: &[u8]) -> String {
        self.pending.extend_from_slice(input);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush whatever is still held back. Leftover bytes are invalid by now.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }

    /// Returns `true` if bytes are held back waiting for completion.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"data: hi"), "data: hi");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn multibyte_split_across_chunks() {
        let bytes = "你好🌍".as_bytes();
        for cut in 1..bytes.len() {
            let mut decoder = Utf8Decoder::new();
            let mut text = decoder.decode(&bytes[..cut]);
            text.push_str(&decoder.decode(&bytes[cut..]));
            text.push_str(&decoder.finish());
            assert_eq!(text, "你好🌍", "cut at {cut}");
        }
    }

    #[test]
    fn byte_by_byte_feeding() {
        let source = "a é 🌍 z";
        let mut decoder = Utf8Decoder::new();
        let text: String = source
            .as_bytes()
            .iter()
            .map(|b| decoder.decode(std::slice::from_ref(b)))
            .collect();
        assert_eq!(text, source);
    }

    #[test]
    fn invalid_byte_becomes_replacement() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn truncated_sequence_flushes_as_replacement() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[b'x', 0xE4, 0xBD]), "x");
        assert!(decoder.has_pending());
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn finish_on_empty_is_empty() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.finish(), "");
    }
}
