// Error taxonomy for the text reader: {io, out-of-memory, shape-mismatch,
// parse-failure, user-callback-failure, argument-validation}.
//
// Every parse-time variant carries the row/column/type context the row
// reader is required to decorate errors with (see ReadTextError::parse_failure
// and friends) rather than relying on callers to reconstruct it from a
// generic message.

use std::fmt;

/// Errors raised while validating configuration, constructing a stream, or
/// reading rows.
#[derive(thiserror::Error, Debug)]
pub enum ReadTextError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("allocation failed: {context}")]
    OutOfMemory { context: &'static str },

    #[error(
        "the number of fields in line {line} ({actual}) does not match the number \
         of fields at the start of the file ({expected})"
    )]
    RaggedRow {
        line: usize,
        actual: usize,
        expected: usize,
    },

    #[error("could not convert string {text:?} to {target_type} at row {row}, column {column}")]
    ParseFailure {
        row: usize,
        column: usize,
        target_type: &'static str,
        text: String,
    },

    #[error("user converter raised an exception at row {row}, column {column}: {source}")]
    UserCallback {
        row: usize,
        column: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid argument: {0}")]
    ArgumentValidation(String),
}

impl ReadTextError {
    pub fn parse_failure(row: usize, column: usize, target_type: &'static str, text: &str) -> Self {
        ReadTextError::ParseFailure {
            row,
            column,
            target_type,
            text: text.to_string(),
        }
    }

    pub fn ragged_row(line: usize, actual: usize, expected: usize) -> Self {
        ReadTextError::RaggedRow {
            line,
            actual,
            expected,
        }
    }

    pub fn argument(msg: impl Into<String>) -> Self {
        ReadTextError::ArgumentValidation(msg.into())
    }

    pub fn out_of_memory(context: &'static str) -> Self {
        ReadTextError::OutOfMemory { context }
    }

    pub fn user_callback(
        row: usize,
        column: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ReadTextError::UserCallback {
            row,
            column,
            source: Box::new(source),
        }
    }
}

/// A minimal boxed-string error for user conversion callbacks, so callers
/// don't need to define their own `std::error::Error` type just to plug a
/// closure into `converters`.
#[derive(Debug)]
pub struct CallbackError(pub String);

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CallbackError {}

pub type Result<T> = std::result::Result<T, ReadTextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failure_carries_context() {
        let err = ReadTextError::parse_failure(2, 0, "int64", "abc");
        let msg = err.to_string();
        assert!(msg.contains("row 2"));
        assert!(msg.contains("column 0"));
        assert!(msg.contains("int64"));
    }

    #[test]
    fn ragged_row_names_the_line() {
        let err = ReadTextError::ragged_row(2, 2, 3);
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn user_callback_nests_the_cause() {
        let err = ReadTextError::user_callback(1, 1, CallbackError("bad value".into()));
        assert!(err.to_string().contains("bad value"));
    }
}
