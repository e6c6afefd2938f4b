// Per-column descriptors: {type code, byte size, byte offset}. Modelled as a
// tagged variant per column (DESIGN NOTES §9, "Polymorphism over field
// types") rather than a trait object — dispatch in the converters and reader
// is a match on the tag, the same shape the teacher uses for its own
// strategy dispatch (`dispatch_boundary_parse`, `dispatch_boundaries_to_term`
// in lib.rs: a handful of `match`/`if` branches picking a concrete function,
// never a vtable).

/// The built-in conversion targets a column can have. `Generic` covers both
/// the user-callback path and the "default object" fallback (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int { width: IntWidth, signed: bool },
    Float { width: FloatWidth },
    Complex { width: FloatWidth },
    Bytes { width: usize },
    Wide { width: usize },
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

impl IntWidth {
    pub fn bytes(self) -> usize {
        match self {
            IntWidth::W8 => 1,
            IntWidth::W16 => 2,
            IntWidth::W32 => 4,
            IntWidth::W64 => 8,
        }
    }
}

impl FloatWidth {
    pub fn bytes(self) -> usize {
        match self {
            FloatWidth::F32 => 4,
            FloatWidth::F64 => 8,
        }
    }
}

impl FieldType {
    /// Size in bytes of one element of this type. Complex is two floats
    /// (real, imaginary) back to back.
    pub fn item_size(&self) -> usize {
        match self {
            FieldType::Int { width, .. } => width.bytes(),
            FieldType::Float { width } => width.bytes(),
            FieldType::Complex { width } => width.bytes() * 2,
            FieldType::Bytes { width } => *width,
            FieldType::Wide { width } => width * 4,
            FieldType::Generic => 0,
        }
    }

    /// True for the zero-width string types that pick their width from the
    /// first data row (§4.3 step 6, "Grow string widths").
    pub fn is_growable(&self) -> bool {
        matches!(
            self,
            FieldType::Bytes { width: 0 } | FieldType::Wide { width: 0 }
        )
    }

    pub fn with_width(self, width: usize) -> FieldType {
        match self {
            FieldType::Bytes { .. } => FieldType::Bytes { width },
            FieldType::Wide { .. } => FieldType::Wide { width },
            other => other,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Int { width: IntWidth::W8, signed: true } => "int8",
            FieldType::Int { width: IntWidth::W16, signed: true } => "int16",
            FieldType::Int { width: IntWidth::W32, signed: true } => "int32",
            FieldType::Int { width: IntWidth::W64, signed: true } => "int64",
            FieldType::Int { width: IntWidth::W8, signed: false } => "uint8",
            FieldType::Int { width: IntWidth::W16, signed: false } => "uint16",
            FieldType::Int { width: IntWidth::W32, signed: false } => "uint32",
            FieldType::Int { width: IntWidth::W64, signed: false } => "uint64",
            FieldType::Float { width: FloatWidth::F32 } => "float32",
            FieldType::Float { width: FloatWidth::F64 } => "float64",
            FieldType::Complex { width: FloatWidth::F32 } => "complex64",
            FieldType::Complex { width: FloatWidth::F64 } => "complex128",
            FieldType::Bytes { .. } => "bytes",
            FieldType::Wide { .. } => "str",
            FieldType::Generic => "object",
        }
    }
}

/// Whether a column's multi-byte values should be written in this
/// platform's native byte order or byte-swapped (§3: "if the target dtype
/// is non-native, the converter writes in native order and then
/// byte-swaps one element").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Native,
    Swapped,
}

/// One column's full descriptor: type, byte size, its offset within a row,
/// and its target byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field_type: FieldType,
    pub byte_offset: usize,
    pub byte_order: ByteOrder,
}

/// The caller-supplied schema (§4.5). Homogeneous output has exactly one
/// descriptor, reused with column-index byte offsets; structured output has
/// one descriptor per field at cumulative offsets.
#[derive(Debug, Clone)]
pub struct FieldTable {
    fields: Vec<FieldDescriptor>,
    homogeneous_type: Option<FieldType>,
    row_size: usize,
}

impl FieldTable {
    /// A single repeated type across `columns` output columns.
    pub fn homogeneous(field_type: FieldType, columns: usize) -> Self {
        let item_size = field_type.item_size();
        let fields = (0..columns)
            .map(|i| FieldDescriptor {
                field_type,
                byte_offset: i * item_size,
                byte_order: ByteOrder::Native,
            })
            .collect();
        FieldTable {
            fields,
            homogeneous_type: Some(field_type),
            row_size: item_size * columns,
        }
    }

    /// One distinct type per field, laid out at cumulative byte offsets.
    pub fn structured(field_types: Vec<FieldType>) -> Self {
        let mut offset = 0;
        let fields = field_types
            .into_iter()
            .map(|field_type| {
                let desc = FieldDescriptor {
                    field_type,
                    byte_offset: offset,
                    byte_order: ByteOrder::Native,
                };
                offset += field_type.item_size();
                desc
            })
            .collect();
        FieldTable {
            fields,
            homogeneous_type: None,
            row_size: offset,
        }
    }

    /// Rebuilds a homogeneous table for a column count discovered from the
    /// first data row (§4.3 step 2: "else it is the field count of that
    /// first row"). A no-op for a structured table.
    pub fn set_homogeneous_columns(&mut self, columns: usize) {
        let Some(field_type) = self.homogeneous_type else {
            return;
        };
        *self = FieldTable::homogeneous(field_type, columns);
    }

    /// Marks one column's output as requiring a byte swap after conversion,
    /// for a caller whose target dtype specifies non-native byte order.
    pub fn set_byte_order(&mut self, column: usize, order: ByteOrder) {
        self.fields[column].byte_order = order;
    }

    pub fn is_homogeneous(&self) -> bool {
        self.homogeneous_type.is_some()
    }

    /// The shared element type for a homogeneous table, if any — used to
    /// re-derive the table once the column count is discovered from the
    /// first data row (§4.3 step 2).
    pub fn homogeneous_type(&self) -> Option<FieldType> {
        self.homogeneous_type
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }

    pub fn descriptor(&self, column: usize) -> &FieldDescriptor {
        &self.fields[column]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Re-derive byte offsets and row size after widening a growable
    /// single-column homogeneous string type (§4.3 step 6). Only valid for
    /// the homogeneous case: structured schemas never grow.
    pub fn widen_homogeneous(&mut self, width: usize) {
        let Some(base_type) = self.homogeneous_type else {
            return;
        };
        let widened = base_type.with_width(width);
        let item_size = widened.item_size();
        for (i, desc) in self.fields.iter_mut().enumerate() {
            desc.field_type = widened;
            desc.byte_offset = i * item_size;
            // byte_order left as-is: widening only ever applies to
            // byte/wide string columns, which have no endianness concept
            // beyond the per-codepoint swap the wide converter applies.
        }
        self.homogeneous_type = Some(widened);
        self.row_size = item_size * self.fields.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homogeneous_offsets_are_column_times_item_size() {
        let table = FieldTable::homogeneous(
            FieldType::Int {
                width: IntWidth::W64,
                signed: true,
            },
            3,
        );
        assert_eq!(table.row_size(), 24);
        assert_eq!(table.descriptor(2).byte_offset, 16);
    }

    #[test]
    fn structured_offsets_are_cumulative() {
        let table = FieldTable::structured(vec![
            FieldType::Int {
                width: IntWidth::W32,
                signed: true,
            },
            FieldType::Bytes { width: 8 },
            FieldType::Int {
                width: IntWidth::W32,
                signed: true,
            },
        ]);
        assert_eq!(table.descriptor(0).byte_offset, 0);
        assert_eq!(table.descriptor(1).byte_offset, 4);
        assert_eq!(table.descriptor(2).byte_offset, 12);
        assert_eq!(table.row_size(), 16);
    }

    #[test]
    fn growable_bytes_widen_in_place() {
        let mut table = FieldTable::homogeneous(FieldType::Bytes { width: 0 }, 2);
        assert!(table.descriptor(0).field_type.is_growable());
        table.widen_homogeneous(5);
        assert_eq!(table.row_size(), 10);
        assert_eq!(table.descriptor(1).byte_offset, 5);
    }
}
