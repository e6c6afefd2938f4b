// Parser configuration: delimiter/comment/quote/imaginary-unit codepoints plus
// the handful of boolean switches that change tokenizer and converter
// behavior. Validation happens eagerly here, the same way the teacher's
// `decode_separators`/`decode_escape`/`decode_newlines` helpers reject bad
// NIF terms before any parsing begins (lib.rs in the teacher crate) — here
// there is no foreign term to decode, so the same eagerness is expressed as
// plain `Result` checks in the builder.

use crate::error::{ReadTextError, Result};

/// A delimiter, comment, or quote setting: either a specific codepoint or a
/// sentinel that disables the feature (comment/quote) or switches to
/// whitespace-run splitting (delimiter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodepointSetting {
    Char(char),
    Disabled,
}

impl CodepointSetting {
    fn from_str(s: &str, field: &'static str) -> Result<Self> {
        let mut chars = s.chars();
        let Some(c) = chars.next() else {
            return Ok(CodepointSetting::Disabled);
        };
        if chars.next().is_some() {
            return Err(ReadTextError::argument(format!(
                "{field} must be a single codepoint or empty, got {s:?}"
            )));
        }
        Ok(CodepointSetting::Char(c))
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            CodepointSetting::Char(c) => Some(*c),
            CodepointSetting::Disabled => None,
        }
    }
}

/// A comment marker: disabled, or one-to-two codepoints checked longest-first
/// by the tokenizer's `CHECK_COMMENT` state (§4.2), the same way the
/// teacher's `Newlines` abstraction sorts multi-byte patterns longest-first
/// for greedy matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentSetting {
    Marker(Vec<char>),
    Disabled,
}

impl CommentSetting {
    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        match chars.len() {
            0 => Ok(CommentSetting::Disabled),
            1 | 2 => Ok(CommentSetting::Marker(chars)),
            _ => Err(ReadTextError::argument(format!(
                "comment must be one or two codepoints or empty, got {s:?}"
            ))),
        }
    }

    pub fn as_chars(&self) -> &[char] {
        match self {
            CommentSetting::Marker(chars) => chars,
            CommentSetting::Disabled => &[],
        }
    }
}

/// How the generic/user-callback converter path should treat the raw field
/// text before handing it to a callback or the default object path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteConversionMode {
    /// Pass the decoded Unicode string straight through.
    #[default]
    None,
    /// Re-encode as Latin-1 bytes before invoking the user callback
    /// (`byte_converters=True` on the external entry point, §6).
    Latin1BeforeCallback,
    /// Re-encode as Latin-1 bytes on the default (no-callback) object path
    /// (`c_byte_converters=True` on the external entry point, §6).
    DefaultBytesPath,
}

/// Immutable configuration for one `read_rows` call (§3, "Parser configuration").
#[derive(Debug, Clone)]
pub struct ReadTextConfig {
    pub delimiter: CodepointSetting,
    pub comment: CommentSetting,
    pub quote: CodepointSetting,
    pub imaginary_unit: char,
    pub allow_embedded_newline: bool,
    pub ignore_leading_whitespace: bool,
    pub allow_float_for_int: bool,
    pub byte_conversion_mode: ByteConversionMode,
    pub skiprows: usize,
    pub max_rows: Option<usize>,
}

impl Default for ReadTextConfig {
    fn default() -> Self {
        ReadTextConfig {
            delimiter: CodepointSetting::Char(','),
            comment: CommentSetting::Marker(vec!['#']),
            quote: CodepointSetting::Char('"'),
            imaginary_unit: 'j',
            allow_embedded_newline: true,
            ignore_leading_whitespace: false,
            allow_float_for_int: false,
            byte_conversion_mode: ByteConversionMode::None,
            skiprows: 0,
            max_rows: None,
        }
    }
}

impl ReadTextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `delimiter=""` means whitespace-run splitting, which forces
    /// `ignore_leading_whitespace` on regardless of what was set before
    /// (§3: "then `ignore_leading_whitespace` is forced on").
    pub fn delimiter(mut self, s: &str) -> Result<Self> {
        self.delimiter = CodepointSetting::from_str(s, "delimiter")?;
        if self.delimiter == CodepointSetting::Disabled {
            self.ignore_leading_whitespace = true;
        }
        Ok(self)
    }

    /// Accepts a single codepoint, two codepoints (a multi-codepoint marker
    /// like `"//"`), or the empty string to disable comments entirely.
    pub fn comment(mut self, s: &str) -> Result<Self> {
        self.comment = CommentSetting::from_str(s)?;
        Ok(self)
    }

    pub fn quote(mut self, s: &str) -> Result<Self> {
        self.quote = CodepointSetting::from_str(s, "quote")?;
        Ok(self)
    }

    pub fn imaginary_unit(mut self, c: char) -> Self {
        self.imaginary_unit = c;
        self
    }

    pub fn allow_embedded_newline(mut self, v: bool) -> Self {
        self.allow_embedded_newline = v;
        self
    }

    pub fn ignore_leading_whitespace(mut self, v: bool) -> Self {
        self.ignore_leading_whitespace = v;
        self
    }

    pub fn allow_float_for_int(mut self, v: bool) -> Self {
        self.allow_float_for_int = v;
        self
    }

    pub fn byte_conversion_mode(mut self, mode: ByteConversionMode) -> Self {
        self.byte_conversion_mode = mode;
        self
    }

    pub fn skiprows(mut self, n: usize) -> Self {
        self.skiprows = n;
        self
    }

    /// `max_rows`: `None` means unbounded (negative in the external interface, §6).
    pub fn max_rows(mut self, n: Option<usize>) -> Self {
        self.max_rows = n;
        self
    }

    /// True when the delimiter is the whitespace-run sentinel.
    pub fn whitespace_delimited(&self) -> bool {
        self.delimiter == CodepointSetting::Disabled
    }
}
