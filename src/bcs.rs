//! Length-prefixed field encoding for Move `vector<u8>` / `String` arguments.
//!
//! A field is its UTF-8 bytes preceded by the ULEB128 encoding of the byte
//! length. The prefix is capped at three bytes, which covers every payload up
//! to [`MAX_FIELD_LEN`] bytes. This must match the module's argument format
//! byte for byte: a wrong prefix is not rejected on-chain, it is stored as a
//! corrupt field.

use thiserror::Error;

/// Largest payload representable with a three-byte prefix (2^21 - 1).
pub const MAX_FIELD_LEN: usize = (1 << 21) - 1;

/// Maximum number of prefix bytes produced or accepted.
pub const MAX_PREFIX_LEN: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("field is {len} bytes, longer than the {max} byte limit")]
    TooLong { len: usize, max: usize },
    #[error("input ended inside the length prefix")]
    Truncated,
    #[error("length prefix is longer than three bytes")]
    PrefixOverflow,
    #[error("length prefix announces {expected} bytes but {actual} follow")]
    LengthMismatch { expected: usize, actual: usize },
}

/// An encoded field split into its prefix and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedField {
    pub length_prefix: Vec<u8>,
    pub payload: Vec<u8>,
}

impl EncodedField {
    /// Wire form: prefix followed by payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length_prefix.len() + self.payload.len());
        out.extend_from_slice(&self.length_prefix);
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = self.length_prefix;
        out.extend(self.payload);
        out
    }
}

/// ULEB128 length prefix, at most three bytes.
///
/// Lengths above [`MAX_FIELD_LEN`] lose their high bits; use [`try_encode`]
/// when the input size is not bounded by the caller.
pub fn uleb128_len(length: usize) -> Vec<u8> {
    if length < 0x80 {
        vec![length as u8]
    } else if length < 0x4000 {
        vec![((length & 0x7f) | 0x80) as u8, ((length >> 7) & 0x7f) as u8]
    } else {
        vec![
            ((length & 0x7f) | 0x80) as u8,
            (((length >> 7) & 0x7f) | 0x80) as u8,
            ((length >> 14) & 0x7f) as u8,
        ]
    }
}

/// Encodes `text` into its wire form.
pub fn encode(text: &str) -> Vec<u8> {
    let payload = text.as_bytes();
    let mut out = uleb128_len(payload.len());
    out.extend_from_slice(payload);
    out
}

/// Like [`encode`], but refuses payloads the three-byte prefix cannot describe.
pub fn try_encode(text: &str) -> Result<EncodedField, EncodeError> {
    let payload = text.as_bytes();
    if payload.len() > MAX_FIELD_LEN {
        return Err(EncodeError::TooLong {
            len: payload.len(),
            max: MAX_FIELD_LEN,
        });
    }

    Ok(EncodedField {
        length_prefix: uleb128_len(payload.len()),
        payload: payload.to_vec(),
    })
}

/// Splits a wire-form field back into prefix and payload.
pub fn decode(bytes: &[u8]) -> Result<EncodedField, EncodeError> {
    let mut length = 0usize;
    let mut prefix_len = 0usize;

    loop {
        if prefix_len == MAX_PREFIX_LEN {
            return Err(EncodeError::PrefixOverflow);
        }
        let byte = *bytes.get(prefix_len).ok_or(EncodeError::Truncated)?;
        length |= usize::from(byte & 0x7f) << (7 * prefix_len);
        prefix_len += 1;
        if byte & 0x80 == 0 {
            break;
        }
    }

    let payload = &bytes[prefix_len..];
    if payload.len() != length {
        return Err(EncodeError::LengthMismatch {
            expected: length,
            actual: payload.len(),
        });
    }

    Ok(EncodedField {
        length_prefix: bytes[..prefix_len].to_vec(),
        payload: payload.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of_len(len: usize) -> String {
        "a".repeat(len)
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(""), vec![0]);
    }

    #[test]
    fn test_prefix_boundaries() {
        assert_eq!(encode(&text_of_len(127))[..1], [127]);
        assert_eq!(encode(&text_of_len(127)).len(), 128);

        let encoded = encode(&text_of_len(128));
        assert_eq!(encoded[..2], [0x80, 0x01]);
        assert_eq!(encoded.len(), 130);

        assert_eq!(encode(&text_of_len(16383))[..2], [0xff, 0x7f]);

        let encoded = encode(&text_of_len(16384));
        assert_eq!(encoded[..3], [0x80, 0x80, 0x01]);
        assert_eq!(encoded.len(), 16387);
    }

    #[test]
    fn test_length_counts_bytes_not_chars() {
        // "é" is two bytes, the dragon emoji four.
        let encoded = encode("é🐉");
        assert_eq!(encoded[0], 6);
        assert_eq!(&encoded[1..], "é🐉".as_bytes());
    }

    #[test]
    fn test_max_field_prefix() {
        assert_eq!(uleb128_len(MAX_FIELD_LEN), vec![0xff, 0xff, 0x7f]);
    }

    #[test]
    fn test_try_encode_rejects_oversized() {
        let text = text_of_len(MAX_FIELD_LEN + 1);
        assert_eq!(
            try_encode(&text),
            Err(EncodeError::TooLong {
                len: MAX_FIELD_LEN + 1,
                max: MAX_FIELD_LEN
            })
        );
    }

    #[test]
    fn test_try_encode_matches_encode() {
        let long = text_of_len(300);
        for text in ["", "Cool Dragon #1", long.as_str()] {
            assert_eq!(try_encode(text).unwrap().into_bytes(), encode(text));
        }
    }

    #[test]
    fn test_round_trip() {
        for text in [
            String::new(),
            "https://example.com/image.jpg".to_string(),
            "ünïcødé ✓".repeat(40),
            text_of_len(16384),
        ] {
            let decoded = decode(&encode(&text)).unwrap();
            assert_eq!(decoded.payload, text.as_bytes());
        }
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode(&[]), Err(EncodeError::Truncated));
        assert_eq!(decode(&[0x80]), Err(EncodeError::Truncated));
        assert_eq!(decode(&[0x80, 0x80, 0x80, 0x01]), Err(EncodeError::PrefixOverflow));
        assert_eq!(
            decode(&[3, b'a']),
            Err(EncodeError::LengthMismatch {
                expected: 3,
                actual: 1
            })
        );
    }
}
