//! Tagged-token messages exchanged with the device service.
//!
//! Every argument and every result travels as a token: a one-byte tag
//! followed by a self-delimiting payload.
//!
//! ```text
//! Integer:  'i' <decimal> 's'             i42s  i-7s
//! Text:     's' <byte length> ':' <utf-8> s3:abc  s0:
//! ```
//!
//! Tokens are decoded strictly left to right. A request is built with
//! [`Message`], written with [`MessageWriter`], and the reply is pulled token
//! by token with [`ResponseReader`]. Buffers that are already complete are
//! drained with [`TokenCursor`].

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod cursor;
pub mod error;
pub mod message;
pub mod reader;
pub mod token;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::TokenCodec;
pub use codec::{
    decode_token, decode_token_from, encode_integer, encode_text, integer_from_text,
    text_from_bytes, text_from_integer, CodecConfig, DEFAULT_MAX_TEXT_LEN,
};
pub use cursor::{next_is_int, next_is_text, peek_tag, TokenCursor};
pub use error::{Found, MessageError, Result};
pub use message::Message;
pub use reader::{ReaderState, ResponseReader};
pub use token::{Tag, Token};
pub use writer::MessageWriter;
