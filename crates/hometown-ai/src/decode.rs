//! Incremental UTF-8 decoding for chunked response bodies

/// Decodes a byte stream into text across chunk boundaries.
///
/// A multi-byte sequence cut off at the end of one chunk is held back and
/// completed by the next. Invalid bytes become U+FFFD, as does an incomplete
/// sequence still pending at [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning all text that is complete so far
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut pos = 0;

        while pos < bytes.len() {
            match std::str::from_utf8(&bytes[pos..]) {
                Ok(text) => {
                    out.push_str(text);
                    pos = bytes.len();
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&bytes[pos..pos + valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            pos += valid + len;
                        }
                        None => {
                            // Truncated sequence at the end: wait for more bytes.
                            pos += valid;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = bytes[pos..].to_vec();
        out
    }

    /// Flush the decoder at end of stream
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }

    /// Whether bytes of an unfinished character are being held back
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let mut d = Utf8StreamDecoder::new();
        assert_eq!(d.decode(b"data: hi"), "data: hi");
        assert!(!d.has_pending());
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        // "안" is EC 95 88
        let mut d = Utf8StreamDecoder::new();
        assert_eq!(d.decode(&[b'a', 0xEC, 0x95]), "a");
        assert!(d.has_pending());
        assert_eq!(d.decode(&[0x88, b'b']), "안b");
        assert!(!d.has_pending());
    }

    #[test]
    fn test_four_byte_split_one_byte_at_a_time() {
        let bytes = "😀".as_bytes();
        let mut d = Utf8StreamDecoder::new();
        let mut out = String::new();
        for b in bytes {
            out.push_str(&d.decode(std::slice::from_ref(b)));
        }
        assert_eq!(out, "😀");
    }

    #[test]
    fn test_invalid_byte_replaced() {
        let mut d = Utf8StreamDecoder::new();
        assert_eq!(d.decode(&[b'x', 0xFF, b'y']), "x\u{FFFD}y");
    }

    #[test]
    fn test_finish_with_truncated_sequence() {
        let mut d = Utf8StreamDecoder::new();
        assert_eq!(d.decode(&[0xE2, 0x82]), "");
        assert_eq!(d.finish(), "\u{FFFD}");
        assert_eq!(d.finish(), "");
    }
}
