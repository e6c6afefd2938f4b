// Byte -> codepoint decoding for the bytes/file sources (§4.1.1). This is
// the mirror image of the teacher's `strategy/encoding.rs`, which converts
// the other way (codepoints -> bytes) for CSV *output*; the conversions
// themselves reuse the same "ASCII fast path, otherwise go through char"
// shape and the same deliberate choice to hand-roll them rather than pull
// in an external encoding crate, since the teacher explicitly ruled that
// out as overkill for single-byte/UTF-16 targets.

use crate::error::{ReadTextError, Result};

/// How the raw bytes of a file or in-memory buffer map to Unicode scalar
/// values. `Utf8` is the default (§4.1.1: "matching 'default platform
/// encoding' for a Rust crate with no locale subsystem of its own").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
    Utf16Le,
    Utf16Be,
}

/// Decode a full byte buffer into codepoints. Called once per buffer
/// refill rather than once per field, so the decoding cost is proportional
/// to bytes read (§4.1.1).
pub fn decode(bytes: &[u8], encoding: Encoding) -> Result<Vec<char>> {
    match encoding {
        Encoding::Utf8 => decode_utf8(bytes),
        Encoding::Latin1 => Ok(decode_latin1(bytes)),
        Encoding::Utf16Le => decode_utf16(bytes, false),
        Encoding::Utf16Be => decode_utf16(bytes, true),
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<Vec<char>> {
    // Fast path: pure ASCII needs no UTF-8 validation beyond the high-bit check.
    if bytes.iter().all(|&b| b < 0x80) {
        return Ok(bytes.iter().map(|&b| b as char).collect());
    }
    let s = std::str::from_utf8(bytes).map_err(|e| {
        ReadTextError::argument(format!("input is not valid UTF-8: {e}"))
    })?;
    Ok(s.chars().collect())
}

fn decode_latin1(bytes: &[u8]) -> Vec<char> {
    // Every Latin-1 byte maps directly onto the Unicode codepoint of the
    // same ordinal value (U+0000..=U+00FF), so this can never fail.
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_utf16(bytes: &[u8], big_endian: bool) -> Result<Vec<char>> {
    if bytes.len() % 2 != 0 {
        return Err(ReadTextError::argument(
            "UTF-16 input has an odd number of bytes",
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| {
            if big_endian {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    char::decode_utf16(units)
        .collect::<std::result::Result<Vec<char>, _>>()
        .map_err(|e| ReadTextError::argument(format!("invalid UTF-16 input: {e:?}")))
}

/// How many leading bytes of `bytes` form complete codepoints under
/// `encoding`. The remainder (at most a few bytes) must be prepended to the
/// next chunk read from the stream, so a multi-byte character split across
/// two reads still decodes correctly.
pub(crate) fn decodable_prefix(bytes: &[u8], encoding: Encoding) -> Result<usize> {
    match encoding {
        Encoding::Utf8 => match std::str::from_utf8(bytes) {
            Ok(_) => Ok(bytes.len()),
            Err(e) => match e.error_len() {
                // A real encoding error, not just a truncated trailing
                // sequence: surface it immediately.
                Some(_) => Err(ReadTextError::argument(format!(
                    "input is not valid UTF-8: {e}"
                ))),
                None => Ok(e.valid_up_to()),
            },
        },
        Encoding::Latin1 => Ok(bytes.len()),
        Encoding::Utf16Le | Encoding::Utf16Be => {
            let mut boundary = bytes.len() - (bytes.len() % 2);
            if boundary >= 2 {
                let pair = &bytes[boundary - 2..boundary];
                let unit = if encoding == Encoding::Utf16Be {
                    u16::from_be_bytes([pair[0], pair[1]])
                } else {
                    u16::from_le_bytes([pair[0], pair[1]])
                };
                // An unpaired leading surrogate at the very end needs its
                // partner from the next chunk before it can be decoded.
                if (0xD800..=0xDBFF).contains(&unit) {
                    boundary -= 2;
                }
            }
            Ok(boundary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_ascii_fast_path() {
        let chars = decode(b"hello", Encoding::Utf8).unwrap();
        assert_eq!(chars, vec!['h', 'e', 'l', 'l', 'o']);
    }

    #[test]
    fn utf8_multibyte() {
        let chars = decode("café".as_bytes(), Encoding::Utf8).unwrap();
        assert_eq!(chars, vec!['c', 'a', 'f', 'é']);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(decode(&[0xff, 0xfe], Encoding::Utf8).is_err());
    }

    #[test]
    fn latin1_maps_byte_to_codepoint() {
        let chars = decode(&[0xe9], Encoding::Latin1).unwrap();
        assert_eq!(chars, vec!['é']);
    }

    #[test]
    fn utf16_le_roundtrips_ascii() {
        let bytes = [0x41, 0x00, 0x42, 0x00];
        let chars = decode(&bytes, Encoding::Utf16Le).unwrap();
        assert_eq!(chars, vec!['A', 'B']);
    }

    #[test]
    fn utf16_be_roundtrips_ascii() {
        let bytes = [0x00, 0x41, 0x00, 0x42];
        let chars = decode(&bytes, Encoding::Utf16Be).unwrap();
        assert_eq!(chars, vec!['A', 'B']);
    }

    #[test]
    fn utf16_odd_length_is_rejected() {
        assert!(decode(&[0x41], Encoding::Utf16Le).is_err());
    }

    #[test]
    fn utf8_prefix_stops_before_truncated_multibyte_char() {
        let bytes = "café".as_bytes();
        // Cut mid-way through the two-byte 'é' (0xC3 0xA9).
        let truncated = &bytes[..bytes.len() - 1];
        let prefix = decodable_prefix(truncated, Encoding::Utf8).unwrap();
        assert_eq!(prefix, bytes.len() - 2);
    }

    #[test]
    fn utf16_prefix_withholds_unpaired_leading_surrogate() {
        // U+1F600 (a surrogate pair) split after the leading surrogate.
        let bytes = [0x3D, 0xD8, 0x00, 0xDE];
        let prefix = decodable_prefix(&bytes[..2], Encoding::Utf16Le).unwrap();
        assert_eq!(prefix, 0);
    }
}
