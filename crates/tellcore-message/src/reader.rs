use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tellcore_transport::IpcStream;
use tracing::trace;

use crate::codec::{decode_token, decode_token_from, CodecConfig};
use crate::cursor::expect_tag;
use crate::error::{MessageError, Result};
use crate::token::{Tag, Token};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Where a [`ResponseReader`] stands between reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// No complete token is buffered.
    AwaitingBytes,
    /// A complete token is buffered and the next read returns without I/O.
    TokenReady,
    /// The peer closed the stream on a token boundary.
    Drained,
    /// The stream failed or framing broke; every later read fails.
    Failed,
}

/// Pulls typed tokens off a live byte stream.
///
/// Bytes accumulate internally until a whole token is framed; callers never
/// see a partial token. Every read blocks until it can answer or the stream
/// fails.
pub struct ResponseReader<T> {
    inner: T,
    buf: BytesMut,
    config: CodecConfig,
    state: ReaderState,
}

impl<T: Read> ResponseReader<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    pub fn with_config(inner: T, config: CodecConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            state: ReaderState::AwaitingBytes,
        }
    }

    /// Read an integer token and treat zero as false, anything else as true.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_tagged(Tag::Integer)?.into_bool()
    }

    pub fn read_integer(&mut self) -> Result<i32> {
        self.read_tagged(Tag::Integer)?.into_int()
    }

    pub fn read_text(&mut self) -> Result<String> {
        self.read_tagged(Tag::Text)?.into_text()
    }

    /// Read the next token of either kind.
    pub fn read_token(&mut self) -> Result<Token> {
        self.next_token(None, false)?
            .ok_or(MessageError::TransportClosed)
    }

    /// Read the next token, or `Ok(None)` if the peer closes cleanly first.
    ///
    /// Only use this when zero further tokens is an acceptable answer; a close
    /// in the middle of a token is still `TransportClosed`.
    pub fn read_token_or_end(&mut self) -> Result<Option<Token>> {
        self.next_token(None, true)
    }

    pub fn state(&self) -> ReaderState {
        match self.state {
            ReaderState::AwaitingBytes | ReaderState::TokenReady => {
                match decode_token(&self.buf, self.config.max_text_len) {
                    Ok(Some(_)) => ReaderState::TokenReady,
                    _ => ReaderState::AwaitingBytes,
                }
            }
            other => other,
        }
    }

    /// Bytes received but not yet handed out as tokens.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn set_max_text_len(&mut self, max_text_len: usize) {
        self.config.max_text_len = max_text_len;
    }

    fn read_tagged(&mut self, expected: Tag) -> Result<Token> {
        self.next_token(Some(expected), false)?
            .ok_or(MessageError::TransportClosed)
    }

    fn next_token(&mut self, expected: Option<Tag>, end_ok: bool) -> Result<Option<Token>> {
        if matches!(self.state, ReaderState::Failed | ReaderState::Drained) {
            return Err(MessageError::TransportClosed);
        }

        loop {
            if let Some(&lead) = self.buf.first() {
                // A wrong tag is known from the first byte; the bytes stay put.
                if let (Some(expected), Some(_)) = (expected, Tag::from_byte(lead)) {
                    expect_tag(&self.buf, expected)?;
                }
                match decode_token_from(&mut self.buf, self.config.max_text_len) {
                    Ok(Some(token)) => {
                        trace!(tag = %token.tag(), buffered = self.buf.len(), "token framed");
                        return Ok(Some(token));
                    }
                    Ok(None) => {}
                    Err(err) => return Err(self.fail(err)),
                }
            }

            if self.fill()? == 0 {
                if self.buf.is_empty() && end_ok {
                    self.state = ReaderState::Drained;
                    return Ok(None);
                }
                return Err(self.fail(MessageError::TransportClosed));
            }
        }
    }

    fn fill(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.fail(MessageError::Io(err))),
            }
        }
    }

    fn fail(&mut self, err: MessageError) -> MessageError {
        self.state = ReaderState::Failed;
        err
    }
}

impl ResponseReader<IpcStream> {
    /// Wrap a service connection and apply the configured read timeout.
    pub fn with_config_ipc(inner: IpcStream, config: CodecConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_message_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_message_error(err: tellcore_transport::TransportError) -> MessageError {
    use tellcore_transport::TransportError;

    match err {
        TransportError::Io(io) | TransportError::Accept(io) => MessageError::Io(io),
        TransportError::Bind { source, .. } | TransportError::Connect { source, .. } => {
            MessageError::Io(source)
        }
        other => MessageError::Io(std::io::Error::other(other.to_string())),
    }
}
