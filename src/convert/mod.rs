// Converter dispatch: codepoint slice -> typed bytes (§4.4). The tagged
// `FieldType` from schema.rs is matched directly rather than boxed behind a
// trait object, the same dispatch shape the teacher uses in
// `lib.rs::dispatch_boundary_parse` — a handful of branches picking a
// concrete function.
//
// Converters report failure with a bare marker; the row reader (which
// already knows the row, input column, and target type name) is the one
// that builds the full `ReadTextError::ParseFailure` (§7: "parse failures
// are created by the converter layer and decorated by the reader").

mod complex;
mod float;
mod generic;
mod integer;
mod text;

pub use generic::{coerce_into, convert_generic, GenericOutput};

use crate::config::ReadTextConfig;
use crate::schema::{ByteOrder, FieldDescriptor, FieldType};

/// Signals a conversion failure; the field text and target type are already
/// known to the caller, so there is nothing further to carry here.
#[derive(Debug, Clone, Copy)]
pub struct ConvertError;

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Runs the built-in converter for `descriptor.field_type`, writing exactly
/// `descriptor.field_type.item_size()` bytes into `out`. `FieldType::Generic`
/// is handled separately by the reader via [`convert_generic`], since it
/// doesn't write fixed-width bytes.
pub fn convert(
    descriptor: &FieldDescriptor,
    field: &[char],
    out: &mut [u8],
    config: &ReadTextConfig,
) -> ConvertResult<()> {
    match descriptor.field_type {
        FieldType::Int { width, signed } => {
            integer::convert(field, width, signed, config.allow_float_for_int, out)?;
            maybe_swap(out, descriptor.byte_order, width.bytes());
        }
        FieldType::Float { width } => {
            float::convert(field, width, out)?;
            maybe_swap(out, descriptor.byte_order, width.bytes());
        }
        FieldType::Complex { width } => {
            complex::convert(field, width, config.imaginary_unit, out)?;
            maybe_swap(out, descriptor.byte_order, width.bytes());
        }
        FieldType::Bytes { width } => {
            text::convert_bytes(field, width, out)?;
        }
        FieldType::Wide { width } => {
            text::convert_wide(field, width, out)?;
            maybe_swap(out, descriptor.byte_order, 4);
        }
        FieldType::Generic => {
            panic!("FieldType::Generic must be routed through convert_generic, not convert");
        }
    }
    Ok(())
}

/// Byte-swaps `out` in `element_size`-wide chunks when the target is
/// non-native (§3: "the converter writes in native order and then
/// byte-swaps one element"). For `Complex`, `element_size` is one float's
/// width, so both the real and imaginary part are swapped independently;
/// for `Wide`, it is 4 (one codepoint), swapping every character.
fn maybe_swap(out: &mut [u8], order: ByteOrder, element_size: usize) {
    if order == ByteOrder::Swapped && element_size > 0 {
        for chunk in out.chunks_mut(element_size) {
            chunk.reverse();
        }
    }
}

/// Trims leading/trailing ASCII whitespace the way every numeric converter
/// is required to (§4.4: "leading and trailing ASCII whitespace are
/// skipped").
fn trim_ascii(chars: &[char]) -> &[char] {
    let is_ws = |c: &char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c');
    let start = chars.iter().position(|c| !is_ws(c)).unwrap_or(chars.len());
    let end = chars.iter().rposition(|c| !is_ws(c)).map_or(start, |i| i + 1);
    &chars[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_ascii_strips_both_ends() {
        let chars: Vec<char> = "  42\t\n".chars().collect();
        assert_eq!(trim_ascii(&chars), &['4', '2']);
    }

    #[test]
    fn trim_ascii_all_whitespace_is_empty() {
        let chars: Vec<char> = "   ".chars().collect();
        assert!(trim_ascii(&chars).is_empty());
    }

    #[test]
    fn maybe_swap_reverses_each_element() {
        let mut out = [0x01, 0x02, 0x03, 0x04];
        maybe_swap(&mut out, ByteOrder::Swapped, 2);
        assert_eq!(out, [0x02, 0x01, 0x04, 0x03]);
    }

    #[test]
    fn maybe_swap_native_is_a_no_op() {
        let mut out = [0x01, 0x02, 0x03, 0x04];
        maybe_swap(&mut out, ByteOrder::Native, 2);
        assert_eq!(out, [0x01, 0x02, 0x03, 0x04]);
    }
}
