// Signed/unsigned integer conversion with overflow-exact bounds checking
// (§4.4). The accumulate-and-compare technique — check against `MAX/10`
// and `MAX%10` before every digit instead of parsing into a wider integer
// and checking after the fact — is the one piece of the spec that names an
// algorithm outright rather than just a contract, so it is implemented
// literally rather than reached for through a generic string-to-int crate.

use super::{float, trim_ascii, ConvertError, ConvertResult};
use crate::schema::IntWidth;

fn bounds_signed(width: IntWidth) -> (i64, i64) {
    match width {
        IntWidth::W8 => (i8::MIN as i64, i8::MAX as i64),
        IntWidth::W16 => (i16::MIN as i64, i16::MAX as i64),
        IntWidth::W32 => (i32::MIN as i64, i32::MAX as i64),
        IntWidth::W64 => (i64::MIN, i64::MAX),
    }
}

fn bound_unsigned(width: IntWidth) -> u64 {
    match width {
        IntWidth::W8 => u8::MAX as u64,
        IntWidth::W16 => u16::MAX as u64,
        IntWidth::W32 => u32::MAX as u64,
        IntWidth::W64 => u64::MAX,
    }
}

/// Parses a signed decimal integer in `[min, max]`, overflow-exact at the
/// boundary (§4.4, "Integer (signed, width W)").
fn parse_signed(chars: &[char], min: i64, max: i64) -> ConvertResult<i64> {
    let chars = trim_ascii(chars);
    let (negative, digits) = match chars.first() {
        Some('-') => (true, &chars[1..]),
        Some('+') => (false, &chars[1..]),
        _ => (false, chars),
    };
    if digits.is_empty() || !digits.iter().all(|c| c.is_ascii_digit()) {
        return Err(ConvertError);
    }
    if negative {
        let limit = min.unsigned_abs();
        let mut acc: u64 = 0;
        for &c in digits {
            let digit = (c as u8 - b'0') as u64;
            if acc > limit / 10 || (acc == limit / 10 && digit > limit % 10) {
                return Err(ConvertError);
            }
            acc = acc * 10 + digit;
        }
        // Safe: acc <= limit == min.unsigned_abs() <= i64::MAX as u64 + 1.
        if acc == limit {
            Ok(min)
        } else {
            Ok(-(acc as i64))
        }
    } else {
        let mut acc: i64 = 0;
        for &c in digits {
            let digit = (c as u8 - b'0') as i64;
            if acc > max / 10 || (acc == max / 10 && digit > max % 10) {
                return Err(ConvertError);
            }
            acc = acc * 10 + digit;
        }
        Ok(acc)
    }
}

/// Parses an unsigned decimal integer in `[0, max]`; a leading `-` is
/// always an error, a leading `+` is allowed (§4.4, "Unsigned").
fn parse_unsigned(chars: &[char], max: u64) -> ConvertResult<u64> {
    let chars = trim_ascii(chars);
    let digits = match chars.first() {
        Some('-') => return Err(ConvertError),
        Some('+') => &chars[1..],
        _ => chars,
    };
    if digits.is_empty() || !digits.iter().all(|c| c.is_ascii_digit()) {
        return Err(ConvertError);
    }
    let mut acc: u64 = 0;
    for &c in digits {
        let digit = (c as u8 - b'0') as u64;
        if acc > max / 10 || (acc == max / 10 && digit > max % 10) {
            return Err(ConvertError);
        }
        acc = acc * 10 + digit;
    }
    Ok(acc)
}

pub fn convert(
    field: &[char],
    width: IntWidth,
    signed: bool,
    allow_float_for_int: bool,
    out: &mut [u8],
) -> ConvertResult<()> {
    if signed {
        let (min, max) = bounds_signed(width);
        match parse_signed(field, min, max) {
            Ok(value) => {
                write_signed(value, width, out);
                return Ok(());
            }
            Err(ConvertError) if allow_float_for_int => {
                let value = float::parse_value(field)?.trunc();
                if value < min as f64 || value > max as f64 || !value.is_finite() {
                    return Err(ConvertError);
                }
                write_signed(value as i64, width, out);
                Ok(())
            }
            Err(e) => Err(e),
        }
    } else {
        let max = bound_unsigned(width);
        match parse_unsigned(field, max) {
            Ok(value) => {
                write_unsigned(value, width, out);
                return Ok(());
            }
            Err(ConvertError) if allow_float_for_int => {
                let value = float::parse_value(field)?.trunc();
                if value < 0.0 || value > max as f64 || !value.is_finite() {
                    return Err(ConvertError);
                }
                write_unsigned(value as u64, width, out);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

fn write_signed(value: i64, width: IntWidth, out: &mut [u8]) {
    match width {
        IntWidth::W8 => out[..1].copy_from_slice(&(value as i8).to_ne_bytes()),
        IntWidth::W16 => out[..2].copy_from_slice(&(value as i16).to_ne_bytes()),
        IntWidth::W32 => out[..4].copy_from_slice(&(value as i32).to_ne_bytes()),
        IntWidth::W64 => out[..8].copy_from_slice(&value.to_ne_bytes()),
    }
}

fn write_unsigned(value: u64, width: IntWidth, out: &mut [u8]) {
    match width {
        IntWidth::W8 => out[..1].copy_from_slice(&(value as u8).to_ne_bytes()),
        IntWidth::W16 => out[..2].copy_from_slice(&(value as u16).to_ne_bytes()),
        IntWidth::W32 => out[..4].copy_from_slice(&(value as u32).to_ne_bytes()),
        IntWidth::W64 => out[..8].copy_from_slice(&value.to_ne_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn int64_max_converts_exactly() {
        let mut out = [0u8; 8];
        convert(&chars("9223372036854775807"), IntWidth::W64, true, false, &mut out).unwrap();
        assert_eq!(i64::from_ne_bytes(out), i64::MAX);
    }

    #[test]
    fn int64_max_plus_one_fails() {
        let mut out = [0u8; 8];
        assert!(
            convert(&chars("9223372036854775808"), IntWidth::W64, true, false, &mut out).is_err()
        );
    }

    #[test]
    fn int64_min_converts_exactly() {
        let mut out = [0u8; 8];
        convert(&chars("-9223372036854775808"), IntWidth::W64, true, false, &mut out).unwrap();
        assert_eq!(i64::from_ne_bytes(out), i64::MIN);
    }

    #[test]
    fn int64_min_minus_one_fails() {
        let mut out = [0u8; 8];
        assert!(
            convert(&chars("-9223372036854775809"), IntWidth::W64, true, false, &mut out).is_err()
        );
    }

    #[test]
    fn unsigned_rejects_minus_sign() {
        let mut out = [0u8; 1];
        assert!(convert(&chars("-1"), IntWidth::W8, false, false, &mut out).is_err());
    }

    #[test]
    fn uint8_max_converts_exactly() {
        let mut out = [0u8; 1];
        convert(&chars("255"), IntWidth::W8, false, false, &mut out).unwrap();
        assert_eq!(out[0], 255);
    }

    #[test]
    fn allow_float_for_int_truncates_toward_zero() {
        let mut out = [0u8; 4];
        convert(&chars("3.9"), IntWidth::W32, true, true, &mut out).unwrap();
        assert_eq!(i32::from_ne_bytes(out), 3);
    }

    #[test]
    fn without_allow_float_for_int_a_decimal_point_fails() {
        let mut out = [0u8; 4];
        assert!(convert(&chars("3.9"), IntWidth::W32, true, false, &mut out).is_err());
    }

    #[test]
    fn embedded_whitespace_is_rejected() {
        let mut out = [0u8; 4];
        assert!(convert(&chars("1 2"), IntWidth::W32, true, false, &mut out).is_err());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let mut out = [0u8; 4];
        convert(&chars("  42  "), IntWidth::W32, true, false, &mut out).unwrap();
        assert_eq!(i32::from_ne_bytes(out), 42);
    }
}
