// Row segmentation state machine (§4.2). This is the component with no
// direct analogue in the teacher's own tokenizers: `strategy::direct` and
// `strategy::general` scan a fully-buffered `&[u8]` slice in one pass,
// while this tokenizer has to cope with a `Stream` that can run dry
// mid-field and hand back a fresh block. The states themselves — unquoted
// run, quoted run, the one-codepoint lookahead after a closing quote — are
// the same shape as `core::field::extract_field_cow_with_escape`'s
// quote-doubling loop, just restructured to pull one codepoint at a time
// instead of scanning a complete buffer.

use crate::config::ReadTextConfig;
use crate::error::Result;
use crate::stream::{BufferState, Stream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub offset: usize,
    pub quoted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeOutcome {
    /// A row was produced (possibly with zero fields — whole-line comments
    /// and blank lines are reported, not silently skipped; see
    /// `Tokenizer::is_blank_row`).
    Row,
    /// The stream had no more data and no partial row was in progress.
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Unquoted,
    Quoted,
    QuotedCheckDoubleQuote,
    CheckComment,
    EatNewline,
    FinalizeLine,
    FinalizeFile,
}

/// Drives one `Stream` through the tokenizer grammar, one row at a time.
/// Owns the row buffer and span table so both are reused across rows
/// without reallocating (§3, "Row buffer ... reused across rows").
pub struct Tokenizer<'a> {
    stream: &'a mut dyn Stream,
    config: &'a ReadTextConfig,
    buffer: Vec<char>,
    pos: usize,
    buffer_exhausted_at_eof: bool,
    row_buffer: Vec<char>,
    spans: Vec<FieldSpan>,
    comment_marker: Vec<char>,
    /// 1-based number of the line the *next* row to be tokenized starts at.
    /// Advanced one row at a time, in `EatNewline`, as each terminating
    /// newline is actually consumed — never by counting newlines across a
    /// whole prefetched block, since a single `Stream::next_buffer` call can
    /// return several rows' worth of text at once.
    line: usize,
    /// The line number of the row most recently returned by `tokenize_row`,
    /// captured before `line` advances past it.
    reported_line: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(stream: &'a mut dyn Stream, config: &'a ReadTextConfig) -> Self {
        let comment_marker = config.comment.as_chars().to_vec();
        Tokenizer {
            stream,
            config,
            buffer: Vec::new(),
            pos: 0,
            buffer_exhausted_at_eof: false,
            row_buffer: Vec::new(),
            spans: Vec::new(),
            comment_marker,
            line: 1,
            reported_line: 1,
        }
    }

    /// 1-based line number of the row most recently returned by
    /// `tokenize_row`, for error messages.
    pub fn line_number(&self) -> usize {
        self.reported_line
    }

    pub fn row_buffer(&self) -> &[char] {
        &self.row_buffer
    }

    pub fn spans(&self) -> &[FieldSpan] {
        &self.spans
    }

    pub fn num_fields(&self) -> usize {
        self.spans.len().saturating_sub(1)
    }

    /// Length in codepoints of field `i`, per the span-pair formula (§3).
    pub fn field_len(&self, i: usize) -> usize {
        self.spans[i + 1].offset - self.spans[i].offset - 1
    }

    pub fn field_chars(&self, i: usize) -> &[char] {
        let start = self.spans[i].offset;
        let len = self.field_len(i);
        &self.row_buffer[start..start + len]
    }

    /// True for a line that tokenized to a single empty field: a blank
    /// line, or a line that was entirely a comment (§3: "If `num_fields ==
    /// 1` and that single field has length 0, the row is treated as
    /// empty").
    pub fn is_blank_row(&self) -> bool {
        self.num_fields() == 1 && self.field_len(0) == 0
    }

    /// Advances past one whole line without keeping its content, for the
    /// skip phase (§4.3 step 1). Reaching EOF early is not an error.
    pub fn skip_line(&mut self) -> Result<TokenizeOutcome> {
        self.tokenize_row()
    }

    fn peek(&mut self) -> Result<Option<char>> {
        loop {
            if self.pos < self.buffer.len() {
                return Ok(Some(self.buffer[self.pos]));
            }
            if self.buffer_exhausted_at_eof {
                return Ok(None);
            }
            let (chars, state) = self.stream.next_buffer()?;
            self.buffer = chars;
            self.pos = 0;
            if state == BufferState::EndOfFile {
                self.buffer_exhausted_at_eof = true;
            }
            if self.buffer.is_empty() {
                if self.buffer_exhausted_at_eof {
                    return Ok(None);
                }
                continue;
            }
        }
    }

    fn bump(&mut self) -> Result<Option<char>> {
        let c = self.peek()?;
        if c.is_some() {
            self.pos += 1;
        }
        Ok(c)
    }

    fn reserve_row(&mut self, additional: usize) {
        let len = self.row_buffer.len();
        if self.row_buffer.capacity() - len < additional {
            let needed = len + additional;
            let rounded = needed.div_ceil(4) * 4;
            self.row_buffer.reserve(rounded - len);
        }
    }

    fn push_row_char(&mut self, c: char) {
        self.reserve_row(1);
        self.row_buffer.push(c);
    }

    fn is_delimiter_boundary(&mut self, c: char) -> bool {
        if self.config.whitespace_delimited() {
            c == ' ' || c == '\t'
        } else {
            Some(c) == self.config.delimiter.as_char()
        }
    }

    fn is_quote(&self, c: char) -> bool {
        Some(c) == self.config.quote.as_char()
    }

    /// Runs the state machine for exactly one row (§4.2, `tokenize_row`).
    pub fn tokenize_row(&mut self) -> Result<TokenizeOutcome> {
        self.row_buffer.clear();
        self.spans.clear();
        self.reported_line = self.line;

        let mut state = State::Init;
        let mut field_start = 0usize;
        let mut field_quoted = false;
        // Whether any field has been opened for this row at all — decides
        // FinalizeLine (a row, even an empty one) vs FinalizeFile (nothing
        // left to read) when EOF hits in Init.
        let mut any_field_opened = false;
        // Whether the *current* field is still open, i.e. has not yet been
        // closed by a delimiter or comment branch — decides whether
        // FinalizeLine still needs to call `finish_field` for it.
        let mut field_open = false;

        loop {
            match state {
                State::Init => {
                    if self.config.ignore_leading_whitespace {
                        while let Some(c) = self.peek()? {
                            if c == ' ' || c == '\t' {
                                self.bump()?;
                            } else {
                                break;
                            }
                        }
                    }
                    let Some(c) = self.peek()? else {
                        state = if any_field_opened {
                            State::FinalizeLine
                        } else {
                            State::FinalizeFile
                        };
                        continue;
                    };
                    any_field_opened = true;
                    field_open = true;
                    field_start = self.row_buffer.len();
                    if self.is_quote(c) {
                        self.bump()?;
                        field_quoted = true;
                        state = State::Quoted;
                    } else {
                        field_quoted = false;
                        state = State::Unquoted;
                    }
                }
                State::Unquoted => {
                    let Some(c) = self.peek()? else {
                        state = State::FinalizeLine;
                        continue;
                    };
                    if c == '\n' {
                        state = State::EatNewline;
                        continue;
                    }
                    if self.is_delimiter_boundary(c) {
                        self.bump()?;
                        self.finish_field(field_start, field_quoted);
                        field_open = false;
                        if self.config.whitespace_delimited() {
                            while let Some(c) = self.peek()? {
                                if c == ' ' || c == '\t' {
                                    self.bump()?;
                                } else {
                                    break;
                                }
                            }
                            match self.peek()? {
                                None => {
                                    state = State::FinalizeLine;
                                }
                                Some('\n') => {
                                    state = State::EatNewline;
                                }
                                Some(_) => {
                                    state = State::Init;
                                }
                            }
                        } else {
                            state = State::Init;
                        }
                        continue;
                    }
                    if !self.comment_marker.is_empty() && c == self.comment_marker[0] {
                        state = State::CheckComment;
                        continue;
                    }
                    self.bump()?;
                    self.push_row_char(c);
                }
                State::CheckComment => {
                    // One codepoint of peek to confirm a multi-codepoint marker;
                    // a single-codepoint marker is confirmed immediately (§4.2:
                    // "after the first matches, the second is checked with one
                    // codepoint of peek").
                    if self.comment_marker.len() <= 1 {
                        self.bump()?;
                        self.skip_to_end_of_line()?;
                        self.finish_field(field_start, field_quoted);
                        field_open = false;
                        state = State::EatNewline;
                        continue;
                    }
                    // `bump` cannot return `None` here: `CheckComment` is only
                    // entered right after `Unquoted` peeked this same
                    // codepoint, so the stream still has it buffered.
                    let Some(first) = self.bump()? else {
                        state = State::FinalizeLine;
                        continue;
                    };
                    match self.peek()? {
                        Some(second) if second == self.comment_marker[1] => {
                            self.bump()?;
                            self.skip_to_end_of_line()?;
                            self.finish_field(field_start, field_quoted);
                            field_open = false;
                            state = State::EatNewline;
                        }
                        _ => {
                            // Not a comment after all: the first marker
                            // codepoint was ordinary field content.
                            self.push_row_char(first);
                            state = State::Unquoted;
                        }
                    }
                }
                State::Quoted => {
                    let Some(c) = self.peek()? else {
                        state = State::FinalizeLine;
                        continue;
                    };
                    if self.is_quote(c) {
                        self.bump()?;
                        state = State::QuotedCheckDoubleQuote;
                        continue;
                    }
                    if c == '\n' && !self.config.allow_embedded_newline {
                        state = State::EatNewline;
                        continue;
                    }
                    self.bump()?;
                    self.push_row_char(c);
                }
                State::QuotedCheckDoubleQuote => match self.peek()? {
                    Some(c) if self.is_quote(c) => {
                        self.bump()?;
                        self.push_row_char(c);
                        state = State::Quoted;
                    }
                    _ => {
                        state = State::Unquoted;
                    }
                },
                State::EatNewline => {
                    // Universal newlines were already collapsed to a single
                    // '\n' by the stream (§9, "Universal newlines & stream
                    // framing"); consuming one codepoint here ends the row.
                    // A row that ends at EOF without a terminator (the last
                    // line of a file missing its trailing newline) consumes
                    // nothing here, so the line counter only advances for an
                    // actual newline.
                    if self.peek()? == Some('\n') {
                        self.bump()?;
                        self.line += 1;
                    }
                    state = State::FinalizeLine;
                }
                State::FinalizeLine => {
                    if field_open {
                        self.finish_field(field_start, field_quoted);
                        field_open = false;
                    }
                    self.spans.push(FieldSpan {
                        offset: self.row_buffer.len(),
                        quoted: false,
                    });
                    return Ok(TokenizeOutcome::Row);
                }
                State::FinalizeFile => {
                    return Ok(TokenizeOutcome::Eof);
                }
            }
        }
    }

    fn finish_field(&mut self, field_start: usize, quoted: bool) {
        self.push_row_char('\0');
        self.spans.push(FieldSpan {
            offset: field_start,
            quoted,
        });
    }

    fn skip_to_end_of_line(&mut self) -> Result<()> {
        while let Some(c) = self.peek()? {
            if c == '\n' {
                break;
            }
            self.bump()?;
        }
        Ok(())
    }
}
