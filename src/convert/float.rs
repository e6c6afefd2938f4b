// Floating point conversion (§4.4, "Float (single/double)"). The codepoint
// slice is copied into ASCII — rejecting anything outside the ASCII range
// outright, since nothing above it can be numeric — then handed to Rust's
// own `f64::from_str`, which is already strict about consuming the entire
// string (no partial parse), so the "require the parser to consume
// everything" rule falls out for free instead of needing a manual check.

use super::{trim_ascii, ConvertError, ConvertResult};
use crate::schema::FloatWidth;

/// Codepoint counts at or below this fit in a stack buffer; longer fields
/// fall back to a heap-allocated `String` (§4.4: "stack buffer, heap
/// fallback for lengths > 128").
const STACK_LIMIT: usize = 128;

pub(crate) fn parse_value(field: &[char]) -> ConvertResult<f64> {
    let trimmed = trim_ascii(field);
    if trimmed.is_empty() || trimmed.iter().any(|&c| c as u32 >= 128) {
        return Err(ConvertError);
    }
    if trimmed.len() <= STACK_LIMIT {
        let mut buf = [0u8; STACK_LIMIT];
        for (slot, &c) in buf.iter_mut().zip(trimmed) {
            *slot = c as u8;
        }
        let s = std::str::from_utf8(&buf[..trimmed.len()]).expect("ASCII checked above");
        s.parse::<f64>().map_err(|_| ConvertError)
    } else {
        let s: String = trimmed.iter().collect();
        s.parse::<f64>().map_err(|_| ConvertError)
    }
}

pub fn convert(field: &[char], width: FloatWidth, out: &mut [u8]) -> ConvertResult<()> {
    let value = parse_value(field)?;
    match width {
        FloatWidth::F32 => out[..4].copy_from_slice(&(value as f32).to_ne_bytes()),
        FloatWidth::F64 => out[..8].copy_from_slice(&value.to_ne_bytes()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn parses_plain_decimal() {
        let mut out = [0u8; 8];
        convert(&chars("3.5"), FloatWidth::F64, &mut out).unwrap();
        assert_eq!(f64::from_ne_bytes(out), 3.5);
    }

    #[test]
    fn narrows_to_single_precision() {
        let mut out = [0u8; 4];
        convert(&chars("3.5"), FloatWidth::F32, &mut out).unwrap();
        assert_eq!(f32::from_ne_bytes(out), 3.5f32);
    }

    #[test]
    fn rejects_non_ascii_codepoints() {
        assert!(parse_value(&chars("3.5\u{00b5}")).is_err());
    }

    #[test]
    fn rejects_partial_parse() {
        assert!(parse_value(&chars("3.5garbage")).is_err());
    }

    #[test]
    fn accepts_scientific_notation() {
        assert_eq!(parse_value(&chars("1.5e3")).unwrap(), 1500.0);
    }

    #[test]
    fn long_field_uses_heap_fallback() {
        let long = "0.".to_string() + &"1".repeat(200);
        let chars: Vec<char> = long.chars().collect();
        assert!(parse_value(&chars).is_ok());
    }
}
