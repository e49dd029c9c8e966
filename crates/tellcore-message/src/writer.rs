use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tellcore_transport::IpcStream;
use tracing::trace;

use crate::codec::CodecConfig;
use crate::error::{MessageError, Result};
use crate::message::Message;
use crate::reader::transport_to_message_error;
use crate::token::Token;

/// Writes serialized messages to any `Write` stream.
pub struct MessageWriter<T> {
    inner: T,
    scratch: BytesMut,
    config: CodecConfig,
}

impl<T: Write> MessageWriter<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    pub fn with_config(inner: T, config: CodecConfig) -> Self {
        Self {
            inner,
            scratch: BytesMut::new(),
            config,
        }
    }

    /// Write a whole message and flush (blocking).
    pub fn send(&mut self, message: &Message) -> Result<()> {
        trace!(tokens = message.len(), bytes = message.as_bytes().len(), "sending message");
        write_fully(&mut self.inner, message.as_bytes())?;
        self.flush()
    }

    /// Write a single token and flush.
    pub fn send_token(&mut self, token: &Token) -> Result<()> {
        self.scratch.clear();
        token.encode(&mut self.scratch);
        write_fully(&mut self.inner, &self.scratch)?;
        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(MessageError::Io(err)),
            }
        }
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
}

impl MessageWriter<IpcStream> {
    /// Wrap a service connection and apply the configured write timeout.
    pub fn with_config_ipc(inner: IpcStream, config: CodecConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_message_error)?;
        Ok(Self::with_config(inner, config))
    }
}

fn write_fully<T: Write>(inner: &mut T, bytes: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < bytes.len() {
        match inner.write(&bytes[offset..]) {
            Ok(0) => return Err(MessageError::TransportClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(MessageError::Io(err)),
        }
    }
    Ok(())
}
