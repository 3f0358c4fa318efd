//! IRC message codec for tokio.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};
use crate::line::LineCodec;
use crate::message::Message;

/// Codec turning a byte stream into [`Message`]s and back.
///
/// Blank lines (bare CRLF keepalives some servers send) are skipped rather
/// than reported as parse errors.
#[derive(Debug, Clone, Default)]
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Codec with the default line limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec with a custom line limit in bytes.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Cut an outgoing line at its first line break and refuse NUL.
    ///
    /// Chat text built from store data must never smuggle a second command
    /// onto the wire.
    pub fn sanitize(mut data: String) -> error::Result<String> {
        if let Some(pos) = data.find(['\r', '\n']) {
            data.truncate(pos);
        }
        if data.contains('\0') {
            return Err(ProtocolError::IllegalControlChar('\0'));
        }
        Ok(data)
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        loop {
            match self.inner.decode(src)? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return line.parse::<Message>().map(Some),
            }
        }
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        let line = Self::sanitize(msg.to_string())?;
        self.inner.encode(line, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;

    #[test]
    fn sanitize_truncates_injected_line() {
        let line = IrcCodec::sanitize("PRIVMSG #c :hi\r\nQUIT".to_string()).unwrap();
        assert_eq!(line, "PRIVMSG #c :hi");
    }

    #[test]
    fn sanitize_rejects_nul() {
        assert!(IrcCodec::sanitize("PRIVMSG #c :a\0b".to_string()).is_err());
    }

    #[test]
    fn decode_skips_blank_lines() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("\r\nPING :x\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, Command::PING("x".into(), None));
    }

    #[test]
    fn encode_writes_single_crlf() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Message::join("#pump19"), &mut buf).unwrap();
        assert_eq!(&buf[..], b"JOIN #pump19\r\n");
    }
}
