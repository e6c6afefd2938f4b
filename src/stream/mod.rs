// The stream abstraction (§4.1): a buffered, look-ahead source of
// codepoints that the tokenizer pulls from one block at a time. Three
// concrete sources are provided (file-by-path, an iterable of lines, and
// in-memory bytes with an explicit encoding), matching the external
// interface's `TextSource` variants (§6.1).
//
// The teacher's closest analogue is `strategy::streaming::StreamingParser`:
// it keeps a growable byte buffer, refills it from an `io::Read`, and
// tracks how much of the buffer has been consumed versus how much is still
// pending. The difference here is that this Stream works in codepoints
// (post-decode) rather than raw bytes, and line/newline bookkeeping is
// folded into the refill step instead of left to the caller.

pub mod bytes;
pub mod encoding;
pub mod file;
pub mod iter;

use std::path::PathBuf;

use self::encoding::Encoding;
use crate::error::Result;

/// What the tokenizer can infer about a freshly returned buffer without
/// having to scan it itself first (§4.1: "the stream reports whether the
/// block it just handed back might still contain an unterminated line").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// The block ends mid-line; the caller must request another block to
    /// find the terminating newline.
    MayContainNewline,
    /// The block is known to end exactly on a newline boundary.
    NoNewlineInBuffer,
    /// No more data will ever follow this block (possibly empty).
    EndOfFile,
}

/// How a stream should leave its underlying resource when `close` is
/// called, mirroring the three shutdown behaviors the row reader needs:
/// normal completion, a `max_rows`-bounded read that wants to let a caller
/// resume later, and rewinding for a second pass (§4.1, "close policy").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePolicy {
    /// Leave the resource wherever the last read left it.
    None,
    /// Seek back to the position the stream was opened at.
    RestoreInitialPosition,
    /// Seek to the position after the last row consumed so far.
    RestoreCurrentPosition,
}

/// A buffered codepoint source. Each call to `next_buffer` returns a fresh
/// owned block — the tokenizer copies whatever it needs to keep (row
/// contents, partial fields) into its own row buffer before asking for the
/// next block, so no block needs to outlive the call that produced it.
///
/// Universal newlines (`\n`, bare `\r`, `\r\n`, `\n\r`) are collapsed to a
/// single `\n` before the tokenizer ever sees them — the tokenizer's own
/// `EAT_NEWLINE` state only has to recognize one terminator codepoint.
pub trait Stream {
    /// Returns the next block of codepoints. An empty block paired with
    /// `BufferState::EndOfFile` signals exhaustion.
    fn next_buffer(&mut self) -> Result<(Vec<char>, BufferState)>;

    fn close(&mut self, policy: ClosePolicy) -> Result<()>;
}

/// The three ways `read_text` (lib.rs) can be pointed at input (§6.1):
/// a path to open directly, an already-open iterable of lines, or an
/// in-memory byte buffer paired with the encoding to decode it with.
pub enum TextSource {
    Path(PathBuf, Encoding),
    Lines(Box<dyn Iterator<Item = String> + Send>),
    Bytes(Vec<u8>, Encoding),
}

impl TextSource {
    /// Builds the concrete `Stream` implementation for this source
    /// (§4.1: "Implementations cover (a) a file opened by path, (b) an
    /// iterable-of-strings source..., (c) a bytes source with an explicit
    /// encoding").
    pub fn into_stream(self) -> Result<Box<dyn Stream>> {
        match self {
            TextSource::Path(path, encoding) => {
                Ok(Box::new(file::FileStream::open(path, encoding)?))
            }
            TextSource::Lines(lines) => Ok(Box::new(iter::IterStream::new(lines))),
            TextSource::Bytes(data, encoding) => {
                Ok(Box::new(bytes::BytesStream::new(&data, encoding)?))
            }
        }
    }

    /// Overrides the default `Encoding::Utf8` a `Path`/`Bytes` source was
    /// constructed with (§6: "encoding: for byte sources, default platform
    /// encoding"). A no-op for `Lines`, which is already decoded text.
    pub fn with_encoding(self, encoding: Encoding) -> Self {
        match self {
            TextSource::Path(path, _) => TextSource::Path(path, encoding),
            TextSource::Bytes(data, _) => TextSource::Bytes(data, encoding),
            other @ TextSource::Lines(_) => other,
        }
    }
}

impl From<PathBuf> for TextSource {
    fn from(path: PathBuf) -> Self {
        TextSource::Path(path, Encoding::default())
    }
}

impl From<&str> for TextSource {
    fn from(path: &str) -> Self {
        TextSource::Path(PathBuf::from(path), Encoding::default())
    }
}

impl From<Vec<u8>> for TextSource {
    fn from(bytes: Vec<u8>) -> Self {
        TextSource::Bytes(bytes, Encoding::default())
    }
}

impl From<(Vec<u8>, Encoding)> for TextSource {
    fn from((bytes, encoding): (Vec<u8>, Encoding)) -> Self {
        TextSource::Bytes(bytes, encoding)
    }
}

/// A terminator codepoint left dangling at the end of one block, whose
/// universal-newline partner (if any) is still to come in the next block
/// (§6 grammar: `\r\n` and `\n\r` are each a single terminator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingNewline {
    None,
    /// A trailing bare `\r`; a leading `\n` in the next block is its pair.
    Cr,
    /// A trailing bare `\n`; a leading `\r` in the next block is its pair.
    Lf,
}

impl Default for PendingNewline {
    fn default() -> Self {
        PendingNewline::None
    }
}

/// Collapses universal newlines in a decoded codepoint block into a single
/// `\n`, returning the collapsed codepoints and how many logical lines were
/// terminated inside the block. `pending` carries a trailing bare `\r` or
/// `\n` across a block boundary so a `\r\n` or `\n\r` pair split across two
/// reads still collapses to one line break.
pub(crate) fn collapse_newlines(chars: &[char], pending: &mut PendingNewline) -> (Vec<char>, usize) {
    let mut out = Vec::with_capacity(chars.len());
    let mut lines = 0usize;
    let mut i = 0;
    match *pending {
        PendingNewline::Cr => {
            if chars.first() == Some(&'\n') {
                i = 1;
            }
        }
        PendingNewline::Lf => {
            if chars.first() == Some(&'\r') {
                i = 1;
            }
        }
        PendingNewline::None => {}
    }
    *pending = PendingNewline::None;
    while i < chars.len() {
        match chars[i] {
            '\r' => {
                out.push('\n');
                lines += 1;
                if chars.get(i + 1) == Some(&'\n') {
                    i += 2;
                } else if i + 1 == chars.len() {
                    *pending = PendingNewline::Cr;
                    i += 1;
                } else {
                    i += 1;
                }
            }
            '\n' => {
                out.push('\n');
                lines += 1;
                if chars.get(i + 1) == Some(&'\r') {
                    i += 2;
                } else if i + 1 == chars.len() {
                    *pending = PendingNewline::Lf;
                    i += 1;
                } else {
                    i += 1;
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    (out, lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collapse(s: &str) -> String {
        let mut pending = PendingNewline::None;
        let (out, _) = collapse_newlines(&s.chars().collect::<Vec<_>>(), &mut pending);
        out.into_iter().collect()
    }

    #[test]
    fn lf_passes_through() {
        assert_eq!(collapse("a\nb"), "a\nb");
    }

    #[test]
    fn bare_cr_becomes_lf() {
        assert_eq!(collapse("a\rb"), "a\nb");
    }

    #[test]
    fn crlf_collapses_to_one_lf() {
        assert_eq!(collapse("a\r\nb"), "a\nb");
    }

    #[test]
    fn lfcr_collapses_to_one_lf() {
        assert_eq!(collapse("a\n\rb"), "a\nb");
    }

    #[test]
    fn bytes_source_converts_via_into_stream() {
        let source: TextSource = b"a,b\n".to_vec().into();
        let mut stream = source.into_stream().unwrap();
        let (chars, _) = stream.next_buffer().unwrap();
        assert_eq!(chars, vec!['a', ',', 'b', '\n']);
    }

    #[test]
    fn lines_source_terminates_each_item() {
        let source = TextSource::Lines(Box::new(vec!["1,2".to_string()].into_iter()));
        let mut stream = source.into_stream().unwrap();
        let (chars, _) = stream.next_buffer().unwrap();
        assert_eq!(chars, vec!['1', ',', '2', '\n']);
    }

    #[test]
    fn with_encoding_overrides_bytes_source() {
        let source: TextSource = vec![0xe9].into();
        let source = source.with_encoding(Encoding::Latin1);
        let mut stream = source.into_stream().unwrap();
        let (chars, _) = stream.next_buffer().unwrap();
        assert_eq!(chars, vec!['é']);
    }

    #[test]
    fn cr_split_across_blocks_still_collapses() {
        let mut pending = PendingNewline::None;
        let (first, lines1) = collapse_newlines(&['a', '\r'], &mut pending);
        assert_eq!(first, vec!['a', '\n']);
        assert_eq!(lines1, 1);
        assert_eq!(pending, PendingNewline::Cr);
        let (second, lines2) = collapse_newlines(&['\n', 'b'], &mut pending);
        assert_eq!(second, vec!['b']);
        assert_eq!(lines2, 0);
        assert_eq!(pending, PendingNewline::None);
    }

    #[test]
    fn lf_then_cr_split_across_blocks_still_collapses() {
        let mut pending = PendingNewline::None;
        let (first, lines1) = collapse_newlines(&['a', '\n'], &mut pending);
        assert_eq!(first, vec!['a', '\n']);
        assert_eq!(lines1, 1);
        assert_eq!(pending, PendingNewline::Lf);
        let (second, lines2) = collapse_newlines(&['\r', 'b'], &mut pending);
        assert_eq!(second, vec!['b']);
        assert_eq!(lines2, 0);
        assert_eq!(pending, PendingNewline::None);
    }
}
