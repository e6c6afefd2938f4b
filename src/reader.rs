// Drives the tokenizer, binds converters, and fills the output buffer
// (§4.3, "Row reader"). This is the piece with no single teacher analogue:
// it plays the role the teacher's NIF entry points play in `lib.rs`
// (`parse_csv_rows` and friends) — pick a strategy, loop over rows, hand
// back a result — generalized to typed fixed-width output instead of a
// `Vec<Vec<Term>>` of Erlang terms.

use std::collections::HashMap;

use crate::config::{ByteConversionMode, ReadTextConfig};
use crate::convert::{self, coerce_into, convert_generic, GenericOutput};
use crate::error::{ReadTextError, Result};
use crate::output::OutputBuffer;
use crate::schema::{FieldTable, FieldType};
use crate::stream::Stream;
use crate::tokenizer::{Tokenizer, TokenizeOutcome};

/// A user-supplied per-column conversion callback (§6.1, `converters`).
/// Keyed by *input* column index in the caller-facing API (negative
/// indices allowed, resolved the same way `usecols` entries are).
pub type ConverterFn =
    Box<dyn Fn(&str) -> std::result::Result<GenericOutput, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

/// The result of one `read_rows` call. `object_columns` holds the values
/// for any `FieldType::Generic` output column, keyed by output column
/// index — there is no fixed-width byte representation for those, so they
/// never appear in `data`.
pub struct ReadOutcome {
    pub data: Vec<u8>,
    pub row_size: usize,
    pub rows: usize,
    pub object_columns: HashMap<usize, Vec<GenericOutput>>,
}

fn normalize_index(raw: isize, len: usize) -> Option<usize> {
    let len = len as isize;
    let idx = if raw < 0 { raw + len } else { raw };
    if idx < 0 || idx >= len {
        None
    } else {
        Some(idx as usize)
    }
}

/// Drives one complete read (§4.3 steps 1-7).
pub fn read_rows(
    stream: &mut dyn Stream,
    field_table: &mut FieldTable,
    config: &ReadTextConfig,
    column_selection: Option<&[isize]>,
    user_converters: &HashMap<isize, ConverterFn>,
) -> Result<ReadOutcome> {
    let mut tokenizer = Tokenizer::new(stream, config);

    // Step 1: skip phase. Reaching EOF early is not an error.
    for _ in 0..config.skiprows {
        if tokenizer.skip_line()? == TokenizeOutcome::Eof {
            break;
        }
    }

    // Find the first non-blank row, skipping whole-line comments and blank
    // lines along the way.
    let first_row = loop {
        match tokenizer.tokenize_row()? {
            TokenizeOutcome::Eof => {
                return Ok(ReadOutcome {
                    data: Vec::new(),
                    row_size: field_table.row_size(),
                    rows: 0,
                    object_columns: HashMap::new(),
                });
            }
            TokenizeOutcome::Row if tokenizer.is_blank_row() => continue,
            TokenizeOutcome::Row => break TokenizeOutcome::Row,
        }
    };
    let _ = first_row;

    // Step 2: first-row discovery.
    let actual_num_fields = if let Some(selection) = column_selection {
        selection.len()
    } else if !field_table.is_homogeneous() {
        field_table.len()
    } else {
        tokenizer.num_fields()
    };
    if field_table.is_homogeneous() && column_selection.is_none() {
        field_table.set_homogeneous_columns(actual_num_fields);
    }

    // Step 3: converter binding, by output column.
    let mut bound: Vec<Option<&ConverterFn>> = vec![None; field_table.len()];
    let normalized_converters: HashMap<usize, &ConverterFn> = user_converters
        .iter()
        .filter_map(|(&key, f)| normalize_index(key, actual_num_fields).map(|idx| (idx, f)))
        .collect();
    for (output_idx, slot) in bound.iter_mut().enumerate() {
        let input_col = match column_selection {
            Some(selection) => match normalize_index(selection[output_idx], actual_num_fields) {
                Some(idx) => idx,
                None => continue,
            },
            None => output_idx,
        };
        *slot = normalized_converters.get(&input_col).copied();
    }

    // Step 6 (widen string widths) happens before the first row is written,
    // since the buffer row size must be final before any row is laid out.
    if let Some(field_type) = field_table.homogeneous_type() {
        if field_type.is_growable() {
            let width = (0..tokenizer.num_fields())
                .map(|i| tokenizer.field_len(i))
                .max()
                .unwrap_or(0);
            field_table.widen_homogeneous(width);
        }
    }

    // Step 4: allocate output.
    let row_size = field_table.row_size();
    let mut buffer = match config.max_rows {
        Some(n) => OutputBuffer::with_capacity_rows(row_size, n),
        None => OutputBuffer::with_speculative_capacity(row_size),
    };

    let mut object_columns: HashMap<usize, Vec<GenericOutput>> = HashMap::new();
    let mut rows_written = 0usize;

    // `max_rows == Some(0)` is valid input (§6: "max_rows: integer, negative
    // meaning unbounded"): the buffer was just allocated with zero rows, so
    // writing the first row here would index past the end of an empty
    // `data`. Skip straight to the (already-satisfied) loop guard below.
    if config.max_rows != Some(0) {
        write_row(
            &tokenizer,
            field_table,
            config,
            column_selection,
            &bound,
            &mut buffer,
            &mut object_columns,
            rows_written,
        )?;
        rows_written += 1;
    }

    // Step 5: remaining rows.
    loop {
        if let Some(max_rows) = config.max_rows {
            if rows_written >= max_rows {
                break;
            }
        }
        match tokenizer.tokenize_row()? {
            TokenizeOutcome::Eof => break,
            TokenizeOutcome::Row if tokenizer.is_blank_row() => continue,
            TokenizeOutcome::Row => {}
        }

        if column_selection.is_none() && tokenizer.num_fields() != actual_num_fields {
            return Err(ReadTextError::ragged_row(
                tokenizer.line_number(),
                tokenizer.num_fields(),
                actual_num_fields,
            ));
        }

        buffer.ensure_row(rows_written);
        write_row(
            &tokenizer,
            field_table,
            config,
            column_selection,
            &bound,
            &mut buffer,
            &mut object_columns,
            rows_written,
        )?;
        rows_written += 1;
    }

    let row_size = buffer.row_size();
    let data = buffer.into_trimmed(rows_written);
    Ok(ReadOutcome {
        data,
        row_size,
        rows: rows_written,
        object_columns,
    })
}

#[allow(clippy::too_many_arguments)]
fn write_row(
    tokenizer: &Tokenizer<'_>,
    field_table: &FieldTable,
    config: &ReadTextConfig,
    column_selection: Option<&[isize]>,
    bound: &[Option<&ConverterFn>],
    buffer: &mut OutputBuffer,
    object_columns: &mut HashMap<usize, Vec<GenericOutput>>,
    row_index: usize,
) -> Result<()> {
    let current_num_fields = tokenizer.num_fields();
    let line = tokenizer.line_number();
    let row_size = buffer.row_size();

    // Collect generic-column results first so we can still borrow
    // `tokenizer` immutably while writing into `buffer`.
    let mut generic_results: Vec<(usize, GenericOutput)> = Vec::new();

    {
        let row = buffer.row_mut(row_index);
        for (output_idx, descriptor) in field_table.iter().enumerate() {
            let input_col = match column_selection {
                Some(selection) => selection[output_idx],
                None => output_idx as isize,
            };
            let Some(col) = normalize_index(input_col, current_num_fields) else {
                return Err(ReadTextError::ragged_row(line, current_num_fields, col_bound(input_col)));
            };
            let field = tokenizer.field_chars(col);
            let field_text: String = field.iter().collect();

            if let Some(callback) = bound[output_idx] {
                let callback_text = if config.byte_conversion_mode == ByteConversionMode::Latin1BeforeCallback {
                    latin1_roundtrip(field).map_err(|_| {
                        ReadTextError::parse_failure(line, col, "latin-1", &field_text)
                    })?
                } else {
                    field_text.clone()
                };
                let value = callback(&callback_text)
                    .map_err(|e| ReadTextError::user_callback(line, col, CallbackFailure(e)))?;
                if descriptor.field_type == FieldType::Generic {
                    generic_results.push((output_idx, value));
                } else {
                    let out = &mut row[descriptor.byte_offset..descriptor.byte_offset + descriptor.field_type.item_size()];
                    coerce_into(&value, descriptor, out).map_err(|_| {
                        ReadTextError::parse_failure(line, col, descriptor.field_type.type_name(), &field_text)
                    })?;
                }
                continue;
            }

            if descriptor.field_type == FieldType::Generic {
                let byte_mode = matches!(config.byte_conversion_mode, ByteConversionMode::DefaultBytesPath);
                let value = convert_generic(field, byte_mode).map_err(|_| {
                    ReadTextError::parse_failure(line, col, descriptor.field_type.type_name(), &field_text)
                })?;
                generic_results.push((output_idx, value));
                continue;
            }

            let out = &mut row[descriptor.byte_offset..descriptor.byte_offset + descriptor.field_type.item_size()];
            convert::convert(descriptor, field, out, config).map_err(|_| {
                ReadTextError::parse_failure(line, col, descriptor.field_type.type_name(), &field_text)
            })?;
        }
    }
    debug_assert_eq!(buffer.row_size(), row_size);

    for (output_idx, value) in generic_results {
        object_columns.entry(output_idx).or_default().push(value);
    }
    Ok(())
}

fn col_bound(input_col: isize) -> usize {
    input_col.unsigned_abs()
}

/// Builds the callback argument for `byte_converters=True` (§6): encode the
/// field as Latin-1 bytes, rejecting any codepoint above 255, then decode it
/// back to a `String` — every Latin-1 byte maps onto the Unicode codepoint
/// of the same ordinal value, so this is an identity transform that only
/// serves to validate the field is Latin-1-representable before a callback
/// written against byte semantics (rather than full Unicode) sees it.
fn latin1_roundtrip(field: &[char]) -> std::result::Result<String, ()> {
    let mut out = String::with_capacity(field.len());
    for &c in field {
        if c as u32 > 255 {
            return Err(());
        }
        out.push(c);
    }
    Ok(out)
}

#[derive(Debug)]
struct CallbackFailure(Box<dyn std::error::Error + Send + Sync>);

impl std::fmt::Display for CallbackFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CallbackFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}
