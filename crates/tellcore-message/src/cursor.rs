use bytes::Bytes;

use crate::codec::{decode_token, DEFAULT_MAX_TEXT_LEN};
use crate::error::{Found, MessageError, Result};
use crate::token::{Tag, Token};

/// Tag of the leading token, if the buffer starts with one.
pub fn peek_tag(buf: &[u8]) -> Option<Tag> {
    buf.first().copied().and_then(Tag::from_byte)
}

/// True iff the leading token is an integer. Never consumes.
pub fn next_is_int(buf: &[u8]) -> bool {
    peek_tag(buf) == Some(Tag::Integer)
}

/// True iff the leading token is text. Never consumes.
pub fn next_is_text(buf: &[u8]) -> bool {
    peek_tag(buf) == Some(Tag::Text)
}

/// Fails with `ProtocolMismatch` unless `buf` starts with `expected`.
pub(crate) fn expect_tag(buf: &[u8], expected: Tag) -> Result<()> {
    let found = match buf.first() {
        None => Found::End,
        Some(&byte) => match Tag::from_byte(byte) {
            Some(tag) if tag == expected => return Ok(()),
            Some(tag) => Found::Tag(tag),
            None => Found::Unknown(byte),
        },
    };
    Err(MessageError::ProtocolMismatch { expected, found })
}

/// Drains tokens from a complete, immutable buffer.
///
/// The cursor only moves forward, and only when a take succeeds. A failed
/// take leaves the position where it was, so the caller sees the same leading
/// token again.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    buf: Bytes,
    pos: usize,
    max_text_len: usize,
    failed: bool,
}

impl TokenCursor {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self::with_max_text_len(buf, DEFAULT_MAX_TEXT_LEN)
    }

    pub fn with_max_text_len(buf: impl Into<Bytes>, max_text_len: usize) -> Self {
        Self {
            buf: buf.into(),
            pos: 0,
            max_text_len,
            failed: false,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Offset of the next token from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn peek_tag(&self) -> Option<Tag> {
        peek_tag(self.remaining())
    }

    pub fn next_is_int(&self) -> bool {
        next_is_int(self.remaining())
    }

    pub fn next_is_text(&self) -> bool {
        next_is_text(self.remaining())
    }

    /// Consume the next token of either kind. `Ok(None)` once drained.
    ///
    /// A token cut off by the end of the buffer is `MalformedPayload`: no
    /// further bytes can complete it.
    pub fn take_token(&mut self) -> Result<Option<Token>> {
        if self.is_empty() {
            return Ok(None);
        }
        match decode_token(self.remaining(), self.max_text_len)? {
            Some((token, used)) => {
                self.pos += used;
                Ok(Some(token))
            }
            None => Err(MessageError::MalformedPayload(format!(
                "truncated token at offset {}",
                self.pos
            ))),
        }
    }

    pub fn take_int(&mut self) -> Result<i32> {
        self.take_tagged(Tag::Integer)?.into_int()
    }

    pub fn take_text(&mut self) -> Result<String> {
        self.take_tagged(Tag::Text)?.into_text()
    }

    /// Integer token read as a flag: zero is false, anything else true.
    pub fn take_bool(&mut self) -> Result<bool> {
        self.take_tagged(Tag::Integer)?.into_bool()
    }

    /// Consume every remaining token.
    pub fn into_tokens(self) -> Result<Vec<Token>> {
        self.collect()
    }

    fn take_tagged(&mut self, expected: Tag) -> Result<Token> {
        expect_tag(self.remaining(), expected)?;
        self.take_token()?.ok_or(MessageError::ProtocolMismatch {
            expected,
            found: Found::End,
        })
    }
}

/// Yields the remaining tokens in order. Iteration ends after the first
/// error; the cursor stays at the offending token.
impl Iterator for TokenCursor {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.take_token() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for TokenCursor {}
