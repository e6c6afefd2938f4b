// The generic / user-callback path (§4.4, "Generic"). `FieldType::Generic`
// has no fixed-width byte representation of its own — the row reader
// collects its results in a side column rather than the row-major byte
// buffer (§4.3; this is the Rust-native stand-in for "the output
// descriptor's set-from-object hook", since there's no dynamic object
// system to hand a value to here).
//
// A user-supplied converter can also be attached to a *typed* column
// (§4.3 step 3, "Converter binding"); in that case its return value is
// coerced into that column's byte representation rather than collected as
// an object, which is what `coerce_into` does.

use super::{ConvertError, ConvertResult};
use crate::schema::{FieldDescriptor, FieldType, FloatWidth, IntWidth};

/// What a [`FieldType::Generic`] column (or a user converter overriding any
/// column) produces before the reader either stores it as an object cell or
/// coerces it into the column's native bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericOutput {
    Text(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
}

/// The default (no user callback) path for a `Generic` column: build a
/// Unicode string from the field, Latin-1-encoding it first if the
/// configured byte-conversion mode asks for bytes instead of text.
pub fn convert_generic(field: &[char], byte_mode: bool) -> ConvertResult<GenericOutput> {
    let text: String = field.iter().collect();
    if byte_mode {
        let mut bytes = Vec::with_capacity(text.len());
        for c in text.chars() {
            let code = c as u32;
            if code > 255 {
                return Err(ConvertError);
            }
            bytes.push(code as u8);
        }
        Ok(GenericOutput::Bytes(bytes))
    } else {
        Ok(GenericOutput::Text(text))
    }
}

/// Coerces a user converter's return value into the byte representation a
/// typed (non-`Generic`) column expects.
pub fn coerce_into(value: &GenericOutput, descriptor: &FieldDescriptor, out: &mut [u8]) -> ConvertResult<()> {
    match (descriptor.field_type, value) {
        (FieldType::Int { width, .. }, GenericOutput::Int(v)) => {
            write_int(*v, width, out);
            Ok(())
        }
        (FieldType::Int { width, .. }, GenericOutput::Float(v)) => {
            write_int(v.trunc() as i64, width, out);
            Ok(())
        }
        (FieldType::Float { width: FloatWidth::F64 }, GenericOutput::Float(v)) => {
            out[..8].copy_from_slice(&v.to_ne_bytes());
            Ok(())
        }
        (FieldType::Float { width: FloatWidth::F32 }, GenericOutput::Float(v)) => {
            out[..4].copy_from_slice(&(*v as f32).to_ne_bytes());
            Ok(())
        }
        (FieldType::Float { width: FloatWidth::F64 }, GenericOutput::Int(v)) => {
            out[..8].copy_from_slice(&(*v as f64).to_ne_bytes());
            Ok(())
        }
        (FieldType::Float { width: FloatWidth::F32 }, GenericOutput::Int(v)) => {
            out[..4].copy_from_slice(&(*v as f32).to_ne_bytes());
            Ok(())
        }
        (FieldType::Bytes { width }, GenericOutput::Bytes(bytes)) => {
            write_bytes(bytes, width, out);
            Ok(())
        }
        (FieldType::Bytes { width }, GenericOutput::Text(text)) => {
            let bytes: Vec<u8> = text.bytes().collect();
            write_bytes(&bytes, width, out);
            Ok(())
        }
        _ => Err(ConvertError),
    }
}

fn write_int(value: i64, width: IntWidth, out: &mut [u8]) {
    match width {
        IntWidth::W8 => out[..1].copy_from_slice(&(value as i8).to_ne_bytes()),
        IntWidth::W16 => out[..2].copy_from_slice(&(value as i16).to_ne_bytes()),
        IntWidth::W32 => out[..4].copy_from_slice(&(value as i32).to_ne_bytes()),
        IntWidth::W64 => out[..8].copy_from_slice(&value.to_ne_bytes()),
    }
}

fn write_bytes(bytes: &[u8], width: usize, out: &mut [u8]) {
    let take = bytes.len().min(width);
    out[..take].copy_from_slice(&bytes[..take]);
    for slot in &mut out[take..width] {
        *slot = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ByteOrder;

    fn descriptor(field_type: FieldType) -> FieldDescriptor {
        FieldDescriptor {
            field_type,
            byte_offset: 0,
            byte_order: ByteOrder::Native,
        }
    }

    #[test]
    fn default_path_builds_text() {
        let chars: Vec<char> = "hello".chars().collect();
        assert_eq!(
            convert_generic(&chars, false).unwrap(),
            GenericOutput::Text("hello".to_string())
        );
    }

    #[test]
    fn byte_mode_encodes_latin1() {
        let chars: Vec<char> = "\u{00e9}".chars().collect();
        assert_eq!(convert_generic(&chars, true).unwrap(), GenericOutput::Bytes(vec![0xe9]));
    }

    #[test]
    fn byte_mode_rejects_out_of_range_codepoints() {
        let chars: Vec<char> = "\u{20ac}".chars().collect();
        assert!(convert_generic(&chars, true).is_err());
    }

    #[test]
    fn coerces_float_into_int_column_by_truncation() {
        let desc = descriptor(FieldType::Int { width: IntWidth::W32, signed: true });
        let mut out = [0u8; 4];
        coerce_into(&GenericOutput::Float(3.9), &desc, &mut out).unwrap();
        assert_eq!(i32::from_ne_bytes(out), 3);
    }

    #[test]
    fn coerces_text_into_bytes_column() {
        let desc = descriptor(FieldType::Bytes { width: 4 });
        let mut out = [0u8; 4];
        coerce_into(&GenericOutput::Text("ab".to_string()), &desc, &mut out).unwrap();
        assert_eq!(&out, b"ab\0\0");
    }
}
