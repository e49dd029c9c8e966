use std::fmt;

use crate::token::Tag;

/// What sat at the head of the buffer when a specific tag was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    /// A well-known tag of the other kind.
    Tag(Tag),
    /// A byte that is not a tag at all.
    Unknown(u8),
    /// Nothing left to read.
    End,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Tag(tag) => write!(f, "{tag} token"),
            Found::Unknown(byte) => write!(f, "unknown byte 0x{byte:02x}"),
            Found::End => f.write_str("end of message"),
        }
    }
}

/// Errors raised while encoding, framing, or consuming tokens.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// A take/read expected one tag and found something else.
    #[error("protocol mismatch: expected {expected} token, found {found}")]
    ProtocolMismatch { expected: Tag, found: Found },

    /// An integer payload is not a signed decimal that fits in 32 bits.
    #[error("invalid numeric token {0:?}")]
    InvalidNumericToken(String),

    /// The connection ended before a complete token was framed.
    #[error("connection closed (incomplete token)")]
    TransportClosed,

    /// A token's framing is internally inconsistent.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The underlying stream failed.
    #[error("message I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MessageError>;
