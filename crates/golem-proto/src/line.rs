//! Newline-delimited framing for tokio.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Default line limit: 512 bytes of message plus 8191 bytes of IRCv3 tags.
pub const DEFAULT_MAX_LEN: usize = 512 + 8191;

/// Codec that splits a byte stream into `\n`-terminated UTF-8 lines.
///
/// Decoded lines keep their line ending; the message parser strips it.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Offset already scanned for a newline.
    next_index: usize,
    max_len: usize,
}

impl LineCodec {
    /// Codec with [`DEFAULT_MAX_LEN`].
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LEN)
    }

    /// Codec with a custom line limit in bytes.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
            if src.len() > self.max_len {
                // Drop the partial line; its tail decodes as a separate line.
                let actual = src.len();
                src.clear();
                self.next_index = 0;
                return Err(ProtocolError::MessageTooLong {
                    actual,
                    limit: self.max_len,
                });
            }
            self.next_index = src.len();
            return Ok(None);
        };

        let line = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;

        if line.len() > self.max_len {
            return Err(ProtocolError::MessageTooLong {
                actual: line.len(),
                limit: self.max_len,
            });
        }

        String::from_utf8(line.to_vec())
            .map(Some)
            .map_err(|e| ProtocolError::InvalidUtf8 {
                byte_pos: e.utf8_error().valid_up_to(),
            })
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        if !line.ends_with('\n') {
            dst.put_slice(b"\r\n");
        }
        Ok(())
    }
}
