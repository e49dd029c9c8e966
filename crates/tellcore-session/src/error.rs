/// Errors surfaced by a [`Session`](crate::Session) call.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The service could not be reached or the socket failed.
    #[error("transport error: {0}")]
    Transport(#[from] tellcore_transport::TransportError),

    /// Encoding, framing, or decoding of a message failed.
    #[error("message error: {0}")]
    Message(#[from] tellcore_message::MessageError),

    /// The session was closed, or an earlier call failed and dropped the
    /// connection.
    #[error("session closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, SessionError>;
