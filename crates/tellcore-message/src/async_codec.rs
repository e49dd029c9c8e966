//! `tokio-util` codec over the same token framing, for async callers.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_token_from, DEFAULT_MAX_TEXT_LEN};
use crate::error::{MessageError, Result};
use crate::message::Message;
use crate::token::Token;

/// Frames tokens on an async byte stream.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    max_text_len: usize,
}

impl TokenCodec {
    pub fn new() -> Self {
        Self::with_max_text_len(DEFAULT_MAX_TEXT_LEN)
    }

    pub fn with_max_text_len(max_text_len: usize) -> Self {
        Self { max_text_len }
    }
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for TokenCodec {
    type Item = Token;
    type Error = MessageError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Token>> {
        decode_token_from(src, self.max_text_len)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Token>> {
        match self.decode(src)? {
            Some(token) => Ok(Some(token)),
            None if src.is_empty() => Ok(None),
            None => Err(MessageError::TransportClosed),
        }
    }
}

impl Encoder<Token> for TokenCodec {
    type Error = MessageError;

    fn encode(&mut self, item: Token, dst: &mut BytesMut) -> Result<()> {
        item.encode(dst);
        Ok(())
    }
}

impl Encoder<&Message> for TokenCodec {
    type Error = MessageError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio::io::AsyncWriteExt;
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;

    #[tokio::test]
    async fn framed_roundtrip() {
        let (client, service) = tokio::io::duplex(64);
        let mut sink = FramedWrite::new(client, TokenCodec::new());
        let mut stream = FramedRead::new(service, TokenCodec::new());

        let msg = Message::command("tdMethods").with_argument(7).with_argument(3);
        sink.send(&msg).await.unwrap();
        sink.send(Token::from("done")).await.unwrap();
        drop(sink);

        let mut tokens = Vec::new();
        while let Some(token) = stream.next().await {
            tokens.push(token.unwrap());
        }
        assert_eq!(
            tokens,
            vec![
                Token::from("tdMethods"),
                Token::Integer(7),
                Token::Integer(3),
                Token::from("done"),
            ]
        );
    }

    #[tokio::test]
    async fn eof_mid_token_is_transport_closed() {
        let (mut client, service) = tokio::io::duplex(64);
        client.write_all(b"s9:tdT").await.unwrap();
        drop(client);

        let mut stream = FramedRead::new(service, TokenCodec::new());
        let result = stream.next().await.unwrap();
        assert!(matches!(result, Err(MessageError::TransportClosed)));
    }

    #[test]
    fn decode_waits_for_complete_token() {
        let mut codec = TokenCodec::default();
        let mut buf = BytesMut::from(&b"i12"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"3s");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Token::Integer(123)));
        assert!(buf.is_empty());
    }
}
