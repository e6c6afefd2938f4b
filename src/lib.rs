// readtext - a fast, predictable reader that turns delimited text into a
// dense, typed array.
//
// The crate is organized leaves-first, same as the component table this
// design follows: `stream` (buffered codepoint source) underlies
// `tokenizer` (row segmentation), which `reader` drives, calling into
// `convert` for each field and laying results out via `schema`/`output`.
// `config` and `error` are the cross-cutting ambient pieces every other
// module depends on.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod reader;
pub mod schema;
pub mod stream;
pub mod tokenizer;

use std::collections::HashMap;

pub use config::{ByteConversionMode, CodepointSetting, CommentSetting, ReadTextConfig};
pub use convert::GenericOutput;
pub use error::{ReadTextError, Result};
pub use output::OutputBuffer;
pub use reader::{ConverterFn, ReadOutcome};
pub use schema::{ByteOrder, FieldDescriptor, FieldTable, FieldType, FloatWidth, IntWidth};
pub use stream::encoding::Encoding;
pub use stream::TextSource;

/// Reads every selected row of `source` into a dense typed array laid out
/// by `field_table`, under `config` (§6, "Entry point").
///
/// `usecols`, when given, is the ordered selection vector mapping output
/// columns to input columns (negative indices allowed, §6's `usecols`);
/// `converters` is the input-column-keyed map of user callbacks (§6's
/// `converters`). Both are passed alongside `field_table`/`config` rather
/// than folded into `ReadTextConfig`, since neither has a meaningful
/// default outside one particular call — `ReadTextConfig` is reused
/// unchanged across reads in the way a caller might reuse parser settings,
/// while a selection vector and a callback map are tied to one `dtype`.
pub fn read_text<S: Into<TextSource>>(
    source: S,
    mut field_table: FieldTable,
    config: ReadTextConfig,
    usecols: Option<Vec<isize>>,
    converters: HashMap<isize, ConverterFn>,
) -> Result<ReadOutcome> {
    if let Some(selection) = &usecols {
        if !field_table.is_homogeneous() && selection.len() != field_table.len() {
            return Err(ReadTextError::argument(format!(
                "usecols has {} entries but the structured dtype has {}",
                selection.len(),
                field_table.len()
            )));
        }
    }

    let mut stream = source.into().into_stream()?;
    reader::read_rows(
        stream.as_mut(),
        &mut field_table,
        &config,
        usecols.as_deref(),
        &converters,
    )
}
