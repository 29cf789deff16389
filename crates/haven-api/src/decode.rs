//! Incremental UTF-8 decoding of the streamed chat body.
//!
//! The backend streams markdown text as raw bytes with no framing; chunk
//! boundaries fall anywhere, including inside a multi-byte character. The
//! decoder carries the incomplete tail of each chunk into the next one and
//! only ever emits whole characters, in order.

use crate::error::{Error, Result};

/// Stateful decoder for one streamed response body.
///
/// Feed chunks in arrival order, then call [`Utf8Decoder::finish`] once the
/// stream closes. Not reusable across responses.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    carry: Vec<u8>,
    consumed: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, appending completed text to `out`.
    ///
    /// A trailing incomplete sequence is held back for the next chunk. A byte
    /// that can never begin or continue a valid sequence is a terminal error;
    /// everything decoded before it has already been appended to `out`.
    pub fn feed(&mut self, chunk: &[u8], out: &mut String) -> Result<()> {
        let bytes: Vec<u8> = if self.carry.is_empty() {
            chunk.to_vec()
        } else {
            let mut held = std::mem::take(&mut self.carry);
            held.extend_from_slice(chunk);
            held
        };

        match std::str::from_utf8(&bytes) {
            Ok(text) => {
                out.push_str(text);
                self.consumed += bytes.len();
                Ok(())
            }
            Err(err) => {
                let valid = err.valid_up_to();
                let prefix = std::str::from_utf8(&bytes[..valid])
                    .map_err(|_| Error::InvalidUtf8 { offset: self.consumed })?;
                out.push_str(prefix);
                self.consumed += valid;
                match err.error_len() {
                    // Unfinishable sequence: the stream is corrupt from here on.
                    Some(_) => Err(Error::InvalidUtf8 {
                        offset: self.consumed,
                    }),
                    // Sequence may complete in the next chunk.
                    None => {
                        self.carry = bytes[valid..].to_vec();
                        Ok(())
                    }
                }
            }
        }
    }

    /// Mark end of stream. Errors if a character was left half-received.
    pub fn finish(&mut self) -> Result<()> {
        if self.carry.is_empty() {
            Ok(())
        } else {
            Err(Error::TruncatedUtf8 {
                pending: self.carry.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_ok(dec: &mut Utf8Decoder, chunk: &[u8]) -> String {
        let mut out = String::new();
        dec.feed(chunk, &mut out).unwrap();
        out
    }

    #[test]
    fn test_ascii_chunks_concatenate_in_order() {
        let mut dec = Utf8Decoder::new();
        let mut text = String::new();
        for chunk in [&b"Hel"[..], b"lo, wo", b"rld"] {
            text.push_str(&feed_ok(&mut dec, chunk));
        }
        dec.finish().unwrap();
        assert_eq!(text, "Hello, world");
    }

    #[test]
    fn test_two_byte_character_split_across_chunks() {
        // "café" with the 0xC3 0xA9 of 'é' split between chunks
        let mut dec = Utf8Decoder::new();
        assert_eq!(feed_ok(&mut dec, &[0x63, 0x61, 0x66, 0xC3]), "caf");
        assert_eq!(feed_ok(&mut dec, &[0xA9]), "é");
        dec.finish().unwrap();
    }

    #[test]
    fn test_four_byte_character_split_three_ways() {
        let emoji = "🏠".as_bytes();
        let mut dec = Utf8Decoder::new();
        assert_eq!(feed_ok(&mut dec, &emoji[..1]), "");
        assert_eq!(feed_ok(&mut dec, &emoji[1..3]), "");
        assert_eq!(feed_ok(&mut dec, &emoji[3..]), "🏠");
        dec.finish().unwrap();
    }

    #[test]
    fn test_invalid_byte_is_terminal_but_keeps_prefix() {
        let mut dec = Utf8Decoder::new();
        let mut out = String::new();
        let err = dec.feed(b"ok\xFFrest", &mut out).unwrap_err();
        assert_eq!(out, "ok");
        assert!(matches!(err, Error::InvalidUtf8 { offset: 2 }));
    }

    #[test]
    fn test_finish_rejects_pending_partial_character() {
        let mut dec = Utf8Decoder::new();
        let mut out = String::new();
        dec.feed(&[0xE2, 0x82], &mut out).unwrap();
        assert_eq!(out, "");
        let err = dec.finish().unwrap_err();
        assert!(matches!(err, Error::TruncatedUtf8 { pending: 2 }));
    }

    #[test]
    fn test_empty_chunks_are_harmless() {
        let mut dec = Utf8Decoder::new();
        assert_eq!(feed_ok(&mut dec, b""), "");
        assert_eq!(feed_ok(&mut dec, b"a"), "a");
        assert_eq!(feed_ok(&mut dec, b""), "");
        dec.finish().unwrap();
    }
}
