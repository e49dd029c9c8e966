use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::cursor::TokenCursor;
use crate::token::Token;

const INITIAL_CAPACITY: usize = 64;

/// An outgoing message under construction.
///
/// Arguments are encoded as they are added, so the buffer always holds the
/// exact bytes that will go on the wire. Earlier arguments are never touched.
///
/// ```
/// use tellcore_message::Message;
///
/// let mut msg = Message::command("tdDim");
/// msg.add_argument(3).add_argument(128);
/// assert_eq!(msg.as_bytes(), b"s5:tdDimi3si128s");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Message {
    buf: BytesMut,
    tokens: usize,
}

impl Message {
    /// An empty message.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_CAPACITY),
            tokens: 0,
        }
    }

    /// A message whose first token is the command identifier.
    pub fn command(name: &str) -> Self {
        let mut msg = Self::new();
        msg.add_argument(name);
        msg
    }

    /// Append one token.
    ///
    /// Accepts anything convertible into a [`Token`]: `i32`, `bool`, `&str`,
    /// `String`, or narrow bytes (`&[u8]`), which are decoded to text first.
    pub fn add_argument(&mut self, arg: impl Into<Token>) -> &mut Self {
        let token = arg.into();
        token.encode(&mut self.buf);
        self.tokens += 1;
        trace!(tag = %token.tag(), index = self.tokens - 1, "added argument");
        self
    }

    /// Builder-style [`add_argument`](Self::add_argument).
    pub fn with_argument(mut self, arg: impl Into<Token>) -> Self {
        self.add_argument(arg);
        self
    }

    /// Number of tokens added so far.
    pub fn len(&self) -> usize {
        self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens == 0
    }

    /// The serialized message.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Finish building and take the serialized bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Finish building and drain the message's own tokens.
    pub fn into_cursor(self) -> TokenCursor {
        TokenCursor::new(self.into_bytes())
    }
}

impl<T: Into<Token>> Extend<T> for Message {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for arg in iter {
            self.add_argument(arg);
        }
    }
}

impl<T: Into<Token>> FromIterator<T> for Message {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut msg = Message::new();
        msg.extend(iter);
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_drains_to_nothing() {
        let msg = Message::new();
        assert!(msg.is_empty());
        assert!(msg.as_bytes().is_empty());

        let mut cursor = msg.into_cursor();
        assert!(cursor.is_empty());
        assert_eq!(cursor.take_token().unwrap(), None);
    }

    #[test]
    fn tokens_drain_in_append_order() {
        let mut msg = Message::new();
        msg.add_argument(1).add_argument("abc").add_argument(-7);
        assert_eq!(msg.len(), 3);

        let mut cursor = msg.into_cursor();
        assert_eq!(cursor.take_int().unwrap(), 1);
        assert_eq!(cursor.take_text().unwrap(), "abc");
        assert_eq!(cursor.take_int().unwrap(), -7);
        assert!(cursor.is_empty());
    }

    #[test]
    fn each_argument_adds_exactly_one_token() {
        let mut msg = Message::command("tdSetName");
        let before = msg.as_bytes().to_vec();
        msg.add_argument(5);
        assert_eq!(msg.len(), 2);
        assert!(msg.as_bytes().starts_with(&before));

        msg.add_argument(&b"Hall"[..]);
        msg.add_argument(true);
        assert_eq!(msg.len(), 4);
        assert_eq!(msg.as_bytes(), b"s9:tdSetNamei5ss4:Halli1s");
    }

    #[test]
    fn narrow_and_wide_text_encode_identically() {
        let narrow = Message::new().with_argument(&b"K\xf6k"[..]);
        let wide = Message::new().with_argument("Kök");
        assert_eq!(narrow.as_bytes(), wide.as_bytes());
    }

    #[test]
    fn collect_from_tokens() {
        let msg: Message = vec![Token::from("tdTurnOn"), Token::from(12)]
            .into_iter()
            .collect();
        assert_eq!(msg.len(), 2);
        assert_eq!(msg.into_bytes().as_ref(), b"s8:tdTurnOni12s");
    }
}
