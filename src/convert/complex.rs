// Complex number conversion (§4.4, "Complex"). Unlike the other numeric
// converters, this one can't just hand the whole field to a strict
// whole-string parser: the real part, the optional sign, and the
// imaginary-unit marker are three separate grammar pieces, so the real and
// imaginary parts are each parsed as a *prefix* of what's left rather than
// the full remaining slice.

use super::{trim_ascii, ConvertError, ConvertResult};
use crate::schema::FloatWidth;

pub fn convert(field: &[char], width: FloatWidth, imaginary_unit: char, out: &mut [u8]) -> ConvertResult<()> {
    let chars = trim_ascii(field);
    if chars.is_empty() {
        return Err(ConvertError);
    }
    let inner = strip_matching_parens(chars)?;
    let (real, imaginary) = parse_body(inner, imaginary_unit)?;
    write(real, imaginary, width, out);
    Ok(())
}

fn strip_matching_parens(chars: &[char]) -> ConvertResult<&[char]> {
    match (chars.first(), chars.last()) {
        (Some('('), Some(')')) if chars.len() >= 2 => Ok(&chars[1..chars.len() - 1]),
        (Some('('), _) => Err(ConvertError),
        _ => Ok(chars),
    }
}

fn parse_body(chars: &[char], imaginary_unit: char) -> ConvertResult<(f64, f64)> {
    let (real, consumed) = numeric_prefix(chars).ok_or(ConvertError)?;
    let rest = &chars[consumed..];

    if rest.is_empty() {
        // "no more input -> imaginary = 0"
        return Ok((real, 0.0));
    }
    if rest.len() == 1 && rest[0] == imaginary_unit {
        // "next codepoint is imaginary_unit -> interpret the already-parsed
        // value as the imaginary part and set real = 0"
        return Ok((0.0, real));
    }
    match rest[0] {
        '+' | '-' => {
            let (imaginary, consumed2) = numeric_prefix(rest).ok_or(ConvertError)?;
            let tail = &rest[consumed2..];
            if tail.len() == 1 && tail[0] == imaginary_unit {
                Ok((real, imaginary))
            } else {
                Err(ConvertError)
            }
        }
        _ => Err(ConvertError),
    }
}

/// Scans the longest valid float syntax (`[+-]?digits?(.digits?)?([eE][+-]?digits)?`,
/// at least one digit required) starting at the front of `chars`, returning
/// the parsed value and how many codepoints it consumed.
fn numeric_prefix(chars: &[char]) -> Option<(f64, usize)> {
    let mut i = 0;
    if matches!(chars.first(), Some('+') | Some('-')) {
        i += 1;
    }
    let mut has_digits = false;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
        has_digits = true;
    }
    if chars.get(i) == Some(&'.') {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
            has_digits = true;
        }
    }
    if !has_digits {
        return None;
    }
    let mantissa_end = i;
    if matches!(chars.get(i), Some('e') | Some('E')) {
        let mut j = i + 1;
        if matches!(chars.get(j), Some('+') | Some('-')) {
            j += 1;
        }
        let exponent_start = j;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j > exponent_start {
            i = j;
        } else {
            i = mantissa_end;
        }
    }
    let text: String = chars[..i].iter().collect();
    text.parse::<f64>().ok().map(|v| (v, i))
}

fn write(real: f64, imaginary: f64, width: FloatWidth, out: &mut [u8]) {
    match width {
        FloatWidth::F32 => {
            out[0..4].copy_from_slice(&(real as f32).to_ne_bytes());
            out[4..8].copy_from_slice(&(imaginary as f32).to_ne_bytes());
        }
        FloatWidth::F64 => {
            out[0..8].copy_from_slice(&real.to_ne_bytes());
            out[8..16].copy_from_slice(&imaginary.to_ne_bytes());
        }
    }
}
