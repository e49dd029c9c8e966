use std::fmt;

use bytes::BytesMut;

use crate::codec::{encode_integer, encode_text, text_from_bytes};
use crate::error::{Found, MessageError, Result};

/// Leading byte of an integer token.
pub const INTEGER_TAG: u8 = b'i';
/// Leading byte of a text token.
pub const TEXT_TAG: u8 = b's';
/// Closes the decimal digits of an integer token.
pub const INTEGER_END: u8 = b's';
/// Separates a text token's length prefix from its payload.
pub const LENGTH_END: u8 = b':';

/// The kind of a token, as announced by its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Integer,
    Text,
}

impl Tag {
    /// Classify a leading byte. `None` for anything that is not a tag.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            INTEGER_TAG => Some(Tag::Integer),
            TEXT_TAG => Some(Tag::Text),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Tag::Integer => INTEGER_TAG,
            Tag::Text => TEXT_TAG,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Integer => f.write_str("integer"),
            Tag::Text => f.write_str("text"),
        }
    }
}

/// One tagged value on the wire.
///
/// Booleans have no tag of their own: `true` and `false` convert into
/// `Integer(1)` and `Integer(0)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Integer(i32),
    Text(String),
}

impl Token {
    pub fn tag(&self) -> Tag {
        match self {
            Token::Integer(_) => Tag::Integer,
            Token::Text(_) => Tag::Text,
        }
    }

    /// Append the wire form of this token to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            Token::Integer(value) => encode_integer(*value, dst),
            Token::Text(text) => encode_text(text, dst),
        }
    }

    /// Unwrap an integer, or report what was found instead.
    pub fn into_int(self) -> Result<i32> {
        match self {
            Token::Integer(value) => Ok(value),
            other => Err(mismatch(Tag::Integer, &other)),
        }
    }

    /// Unwrap a text, or report what was found instead.
    pub fn into_text(self) -> Result<String> {
        match self {
            Token::Text(text) => Ok(text),
            other => Err(mismatch(Tag::Text, &other)),
        }
    }

    /// Interpret an integer token as a flag: zero is false, anything else true.
    pub fn into_bool(self) -> Result<bool> {
        self.into_int().map(|value| value != 0)
    }
}

fn mismatch(expected: Tag, found: &Token) -> MessageError {
    MessageError::ProtocolMismatch {
        expected,
        found: Found::Tag(found.tag()),
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(value) => write!(f, "{value}"),
            Token::Text(text) => write!(f, "{text:?}"),
        }
    }
}

impl From<i32> for Token {
    fn from(value: i32) -> Self {
        Token::Integer(value)
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Token::Integer(i32::from(value))
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::Text(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::Text(value)
    }
}

impl From<&String> for Token {
    fn from(value: &String) -> Self {
        Token::Text(value.clone())
    }
}

/// Narrow bytes are decoded with [`text_from_bytes`] and become text.
impl From<&[u8]> for Token {
    fn from(value: &[u8]) -> Self {
        Token::Text(text_from_bytes(value))
    }
}

impl<const N: usize> From<&[u8; N]> for Token {
    fn from(value: &[u8; N]) -> Self {
        Token::from(&value[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_bytes() {
        assert_eq!(Tag::from_byte(b'i'), Some(Tag::Integer));
        assert_eq!(Tag::from_byte(b's'), Some(Tag::Text));
        assert_eq!(Tag::from_byte(b'1'), None);
        assert_eq!(Tag::Integer.as_byte(), b'i');
        assert_eq!(Tag::Text.as_byte(), b's');
    }

    #[test]
    fn bool_converts_to_integer() {
        assert_eq!(Token::from(true), Token::Integer(1));
        assert_eq!(Token::from(false), Token::Integer(0));
    }

    #[test]
    fn narrow_bytes_become_text() {
        assert_eq!(Token::from(b"Lamp"), Token::Text("Lamp".to_string()));
        assert_eq!(
            Token::from(&b"K\xf6k"[..]),
            Token::Text("Kök".to_string())
        );
    }

    #[test]
    fn into_bool_accepts_any_nonzero() {
        assert!(!Token::Integer(0).into_bool().unwrap());
        assert!(Token::Integer(1).into_bool().unwrap());
        assert!(Token::Integer(-3).into_bool().unwrap());
    }

    #[test]
    fn into_int_rejects_text() {
        let err = Token::Text("1".into()).into_int().unwrap_err();
        assert!(matches!(
            err,
            MessageError::ProtocolMismatch {
                expected: Tag::Integer,
                found: Found::Tag(Tag::Text)
            }
        ));
    }

    #[test]
    fn display() {
        assert_eq!(Token::Integer(-7).to_string(), "-7");
        assert_eq!(Token::Text("abc".into()).to_string(), "\"abc\"");
        assert_eq!(Tag::Text.to_string(), "text");
    }
}
