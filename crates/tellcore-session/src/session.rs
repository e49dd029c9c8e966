use std::sync::{Mutex, MutexGuard, PoisonError};

use tellcore_message::{Message, MessageError, MessageWriter, ResponseReader, Token};
#[cfg(unix)]
use tellcore_transport::ServiceSocket;
use tellcore_transport::IpcStream;
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};

/// One open connection to the device service.
pub struct Session {
    conn: Mutex<Option<Connection>>,
}

struct Connection {
    reader: ResponseReader<IpcStream>,
    writer: MessageWriter<IpcStream>,
}

/// Result tokens of the call in flight.
///
/// Handed to the closure passed to [`Session::call`]; read exactly the
/// tokens the command promises, in order.
pub struct Reply<'a> {
    reader: &'a mut ResponseReader<IpcStream>,
}

impl Reply<'_> {
    pub fn read_bool(&mut self) -> tellcore_message::Result<bool> {
        self.reader.read_bool()
    }

    pub fn read_integer(&mut self) -> tellcore_message::Result<i32> {
        self.reader.read_integer()
    }

    pub fn read_text(&mut self) -> tellcore_message::Result<String> {
        self.reader.read_text()
    }

    pub fn read_token(&mut self) -> tellcore_message::Result<Token> {
        self.reader.read_token()
    }
}

impl Session {
    /// Connect to the service at `config.socket_path`.
    #[cfg(unix)]
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let stream = ServiceSocket::connect(&config.socket_path)?;
        debug!(path = ?config.socket_path, "session opened");
        Self::from_stream(stream, config)
    }

    /// Run a session over an already connected stream.
    pub fn from_stream(stream: IpcStream, config: &SessionConfig) -> Result<Self> {
        let reader_stream = stream.try_clone()?;
        let reader = ResponseReader::with_config_ipc(reader_stream, config.codec.clone())?;
        let writer = MessageWriter::with_config_ipc(stream, config.codec.clone())?;
        Ok(Self {
            conn: Mutex::new(Some(Connection { reader, writer })),
        })
    }

    /// Send `message` and let `read` pull the reply tokens.
    ///
    /// The connection is held for the whole exchange. `read` must consume the
    /// whole reply: bytes left buffered afterwards fail the call. If writing
    /// or reading fails the connection is dropped, since the stream position
    /// is no longer known; every later call returns [`SessionError::Closed`].
    pub fn call<R, F>(&self, message: &Message, read: F) -> Result<R>
    where
        F: FnOnce(&mut Reply<'_>) -> tellcore_message::Result<R>,
    {
        let mut guard = self.lock();
        let conn = guard.as_mut().ok_or(SessionError::Closed)?;

        debug!(tokens = message.len(), "calling service");
        let outcome = conn
            .writer
            .send(message)
            .and_then(|()| {
                read(&mut Reply {
                    reader: &mut conn.reader,
                })
            })
            .and_then(|value| match conn.reader.buffered().len() {
                0 => Ok(value),
                extra => Err(MessageError::MalformedPayload(format!(
                    "{extra} unread reply bytes after call"
                ))),
            });

        match outcome {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(error = %err, "service call failed; dropping connection");
                if let Some(conn) = guard.take() {
                    let _ = conn.writer.get_ref().shutdown();
                }
                Err(err.into())
            }
        }
    }

    /// Call a command that answers with one integer.
    pub fn call_integer(&self, message: &Message) -> Result<i32> {
        self.call(message, |reply| reply.read_integer())
    }

    /// Call a command that answers with one text.
    pub fn call_text(&self, message: &Message) -> Result<String> {
        self.call(message, |reply| reply.read_text())
    }

    /// Call a command that answers with one flag.
    pub fn call_bool(&self, message: &Message) -> Result<bool> {
        self.call(message, |reply| reply.read_bool())
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Shut the connection down. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        if let Some(conn) = self.lock().take() {
            debug!("closing session");
            conn.writer.get_ref().shutdown()?;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        // A panic mid-call leaves the connection in an unknown state.
        self.conn.lock().unwrap_or_else(|poisoned| {
            let mut guard = PoisonError::into_inner(poisoned);
            guard.take();
            guard
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.is_open())
            .finish()
    }
}
