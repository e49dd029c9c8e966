use bytes::{Buf, BufMut, BytesMut};

use crate::error::{MessageError, Result};
use crate::token::{Tag, Token, INTEGER_END, LENGTH_END};

/// Largest magnitude an integer payload may reach: `-2147483648`.
const MAX_INTEGER_MAGNITUDE: u64 = 1 << 31;

/// Longest accepted text length prefix, in digits.
pub const MAX_LENGTH_DIGITS: usize = 10;

/// Default ceiling on a single text payload: 1 MiB.
pub const DEFAULT_MAX_TEXT_LEN: usize = 1024 * 1024;

/// Decode narrow bytes into canonical text.
///
/// UTF-8 input is kept as is. Anything else is read as ISO-8859-1, one byte
/// per code point, so legacy device names survive without replacement
/// characters.
pub fn text_from_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes.iter().copied().map(char::from).collect(),
    }
}

/// Canonical decimal rendering; negatives carry a leading `-`, never `+`.
pub fn text_from_integer(value: i32) -> String {
    value.to_string()
}

/// Parse an optional sign followed by one or more ASCII digits.
pub fn integer_from_text(text: &str) -> Result<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MessageError::InvalidNumericToken(text.to_owned()));
    }
    text.parse::<i32>()
        .map_err(|_| MessageError::InvalidNumericToken(text.to_owned()))
}

/// Append `i<decimal>s`.
pub fn encode_integer(value: i32, dst: &mut BytesMut) {
    let digits = text_from_integer(value);
    dst.reserve(digits.len() + 2);
    dst.put_u8(Tag::Integer.as_byte());
    dst.put_slice(digits.as_bytes());
    dst.put_u8(INTEGER_END);
}

/// Append `s<byte length>:<utf-8 bytes>`.
pub fn encode_text(text: &str, dst: &mut BytesMut) {
    let len = text.len().to_string();
    dst.reserve(len.len() + text.len() + 2);
    dst.put_u8(Tag::Text.as_byte());
    dst.put_slice(len.as_bytes());
    dst.put_u8(LENGTH_END);
    dst.put_slice(text.as_bytes());
}

/// Frame one token at the head of `src` without consuming it.
///
/// Returns the token and the number of bytes it occupies, or `Ok(None)` when
/// `src` ends before the token does. Errors are reported as soon as the bytes
/// seen so far cannot start a valid token, even if more bytes would follow.
pub fn decode_token(src: &[u8], max_text_len: usize) -> Result<Option<(Token, usize)>> {
    let Some(&lead) = src.first() else {
        return Ok(None);
    };
    let body = &src[1..];
    let framed = match Tag::from_byte(lead) {
        Some(Tag::Integer) => decode_integer(body)?.map(|(v, n)| (Token::Integer(v), n)),
        Some(Tag::Text) => decode_text(body, max_text_len)?.map(|(t, n)| (Token::Text(t), n)),
        None => {
            return Err(MessageError::MalformedPayload(format!(
                "unknown tag byte 0x{lead:02x}"
            )))
        }
    };
    Ok(framed.map(|(token, body_len)| (token, body_len + 1)))
}

/// Frame one token and remove its bytes from `src`.
pub fn decode_token_from(src: &mut BytesMut, max_text_len: usize) -> Result<Option<Token>> {
    match decode_token(src, max_text_len)? {
        Some((token, used)) => {
            src.advance(used);
            Ok(Some(token))
        }
        None => Ok(None),
    }
}

fn decode_integer(body: &[u8]) -> Result<Option<(i32, usize)>> {
    let mut magnitude = 0u64;
    for (i, &b) in body.iter().enumerate() {
        if b == INTEGER_END {
            // Only ASCII signs and digits got this far.
            let text = text_from_bytes(&body[..i]);
            return integer_from_text(&text).map(|value| Some((value, i + 1)));
        }
        let sign = i == 0 && (b == b'-' || b == b'+');
        if !sign {
            // Leading zeros are legal; the value, not the digit count, is bounded.
            magnitude = Some(b)
                .filter(u8::is_ascii_digit)
                .and_then(|b| magnitude.checked_mul(10)?.checked_add(u64::from(b - b'0')))
                .filter(|&m| m <= MAX_INTEGER_MAGNITUDE)
                .ok_or_else(|| MessageError::InvalidNumericToken(text_from_bytes(&body[..=i])))?;
        }
    }
    Ok(None)
}

fn decode_text(body: &[u8], max_text_len: usize) -> Result<Option<(String, usize)>> {
    let mut len = 0usize;
    for (i, &b) in body.iter().enumerate() {
        if b == LENGTH_END {
            if i == 0 {
                return Err(MessageError::MalformedPayload(
                    "text token without length".to_string(),
                ));
            }
            let start = i + 1;
            let end = start + len;
            if body.len() < end {
                return Ok(None);
            }
            let text = std::str::from_utf8(&body[start..end]).map_err(|_| {
                MessageError::MalformedPayload("text payload is not valid UTF-8".to_string())
            })?;
            return Ok(Some((text.to_owned(), end)));
        }
        if !b.is_ascii_digit() {
            return Err(MessageError::MalformedPayload(format!(
                "unexpected byte 0x{b:02x} in text length"
            )));
        }
        if i >= MAX_LENGTH_DIGITS {
            return Err(MessageError::MalformedPayload(
                "text length prefix too long".to_string(),
            ));
        }
        len = len
            .checked_mul(10)
            .and_then(|l| l.checked_add(usize::from(b - b'0')))
            .filter(|&l| l <= max_text_len)
            .ok_or_else(|| {
                MessageError::MalformedPayload(format!(
                    "declared text length exceeds limit of {max_text_len} bytes"
                ))
            })?;
    }
    Ok(None)
}

/// Limits and timeouts for reading and writing messages.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Largest text payload accepted from the peer. Default: 1 MiB.
    pub max_text_len: usize,
    /// Read timeout applied to the transport, if any.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout applied to the transport, if any.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(token: &Token) -> BytesMut {
        let mut buf = BytesMut::new();
        token.encode(&mut buf);
        buf
    }

    #[test]
    fn integer_wire_form() {
        assert_eq!(&encoded(&Token::Integer(42))[..], b"i42s");
        assert_eq!(&encoded(&Token::Integer(-7))[..], b"i-7s");
        assert_eq!(&encoded(&Token::Integer(0))[..], b"i0s");
    }

    #[test]
    fn text_wire_form() {
        assert_eq!(&encoded(&Token::from("abc"))[..], b"s3:abc");
        assert_eq!(&encoded(&Token::from(""))[..], b"s0:");
        // Length counts UTF-8 bytes, not characters.
        assert_eq!(&encoded(&Token::from("ö"))[..], "s2:ö".as_bytes());
    }

    #[test]
    fn integer_text_roundtrip_extremes() {
        for value in [i32::MIN, i32::MIN + 1, -1, 0, 1, 255, i32::MAX] {
            assert_eq!(integer_from_text(&text_from_integer(value)).unwrap(), value);
        }
        assert_eq!(text_from_integer(i32::MIN), "-2147483648");
    }

    #[test]
    fn integer_from_text_accepts_plus_sign() {
        assert_eq!(integer_from_text("+15").unwrap(), 15);
        assert_eq!(integer_from_text("-0").unwrap(), 0);
    }

    #[test]
    fn integer_from_text_rejects_garbage() {
        for bad in ["", "-", "+", "12a", " 1", "1 ", "--1", "0x10", "2147483648"] {
            assert!(
                matches!(
                    integer_from_text(bad),
                    Err(MessageError::InvalidNumericToken(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn text_roundtrip_tricky_payloads() {
        for text in ["", "12", "i5s", "s3:abc", "::", "Vardagsrum ö", "日本", "a\0b"] {
            let buf = encoded(&Token::from(text));
            let (token, used) = decode_token(&buf, DEFAULT_MAX_TEXT_LEN).unwrap().unwrap();
            assert_eq!(token, Token::Text(text.to_string()));
            assert_eq!(used, buf.len());
        }
    }

    #[test]
    fn text_from_bytes_utf8_and_latin1() {
        assert_eq!(text_from_bytes(b"Lamp 2"), "Lamp 2");
        assert_eq!(text_from_bytes("Kök".as_bytes()), "Kök");
        assert_eq!(text_from_bytes(b"K\xf6k"), "Kök");
        assert_eq!(text_from_bytes(b""), "");
    }

    #[test]
    fn decode_incomplete_returns_none() {
        for partial in [&b""[..], &b"i"[..], &b"i-12"[..], &b"s"[..], &b"s12"[..], &b"s5:ab"[..]] {
            assert!(
                decode_token(partial, DEFAULT_MAX_TEXT_LEN).unwrap().is_none(),
                "{partial:?} should need more bytes"
            );
        }
    }

    #[test]
    fn decode_rejects_bad_integer_early() {
        let err = decode_token(b"i12x", DEFAULT_MAX_TEXT_LEN).unwrap_err();
        assert!(matches!(err, MessageError::InvalidNumericToken(_)));

        let err = decode_token(b"is", DEFAULT_MAX_TEXT_LEN).unwrap_err();
        assert!(matches!(err, MessageError::InvalidNumericToken(_)));

        let err = decode_token(b"i123456789012", DEFAULT_MAX_TEXT_LEN).unwrap_err();
        assert!(matches!(err, MessageError::InvalidNumericToken(_)));

        let err = decode_token(b"i9999999999s", DEFAULT_MAX_TEXT_LEN).unwrap_err();
        assert!(matches!(err, MessageError::InvalidNumericToken(_)));

        let err = decode_token(b"i2147483648s", DEFAULT_MAX_TEXT_LEN).unwrap_err();
        assert!(matches!(err, MessageError::InvalidNumericToken(_)));
    }

    #[test]
    fn decode_integer_agrees_with_integer_from_text() {
        for wire in [&b"i000000000042s"[..], &b"i-00000000000000007s"[..], &b"i+0s"[..]] {
            let body = &wire[1..wire.len() - 1];
            let text = text_from_bytes(body);
            let (token, used) = decode_token(wire, DEFAULT_MAX_TEXT_LEN).unwrap().unwrap();
            assert_eq!(token, Token::Integer(integer_from_text(&text).unwrap()));
            assert_eq!(used, wire.len());
        }
        assert_eq!(
            decode_token(b"i-2147483648s", DEFAULT_MAX_TEXT_LEN)
                .unwrap()
                .unwrap()
                .0,
            Token::Integer(i32::MIN)
        );
    }

    #[test]
    fn decode_rejects_bad_text_framing() {
        for bad in [&b"s:abc"[..], &b"sx:"[..], &b"s12345678901:"[..], &b"s3;abc"[..]] {
            assert!(
                matches!(
                    decode_token(bad, DEFAULT_MAX_TEXT_LEN),
                    Err(MessageError::MalformedPayload(_))
                ),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn decode_rejects_invalid_utf8_payload() {
        let err = decode_token(b"s2:\xff\xfe", DEFAULT_MAX_TEXT_LEN).unwrap_err();
        assert!(matches!(err, MessageError::MalformedPayload(_)));
    }

    #[test]
    fn decode_enforces_text_limit_before_payload_arrives() {
        let err = decode_token(b"s1000", 16).unwrap_err();
        assert!(matches!(err, MessageError::MalformedPayload(_)));
        assert!(decode_token(b"s16:", 16).unwrap().is_none());
    }

    #[test]
    fn decode_unknown_tag() {
        let err = decode_token(b"x1s", DEFAULT_MAX_TEXT_LEN).unwrap_err();
        assert!(matches!(err, MessageError::MalformedPayload(_)));
    }

    #[test]
    fn decode_from_consumes_exactly_one_token() {
        let mut buf = BytesMut::from(&b"i1ss3:abci-7s"[..]);
        let first = decode_token_from(&mut buf, DEFAULT_MAX_TEXT_LEN)
            .unwrap()
            .unwrap();
        assert_eq!(first, Token::Integer(1));
        assert_eq!(&buf[..], b"s3:abci-7s");

        let second = decode_token_from(&mut buf, DEFAULT_MAX_TEXT_LEN)
            .unwrap()
            .unwrap();
        assert_eq!(second, Token::Text("abc".into()));
        assert_eq!(&buf[..], b"i-7s");
    }

    #[test]
    fn decode_from_leaves_partial_token_in_place() {
        let mut buf = BytesMut::from(&b"s4:ab"[..]);
        assert!(decode_token_from(&mut buf, DEFAULT_MAX_TEXT_LEN)
            .unwrap()
            .is_none());
        assert_eq!(&buf[..], b"s4:ab");
    }
}
