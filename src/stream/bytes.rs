// A stream backed by an in-memory byte buffer with an explicit encoding
// (§6.1: `TextSource::Bytes`). Since the whole buffer is already resident,
// decoding happens once up front rather than per refill — this also means a
// bad encoding is reported immediately instead of partway through a read,
// matching the eager-validation style the rest of the config layer uses.

use super::encoding::{self, Encoding};
use super::{collapse_newlines, BufferState, ClosePolicy, PendingNewline, Stream};
use crate::error::Result;

/// Codepoints handed back per `next_buffer` call, so a large in-memory
/// source still exercises the tokenizer's multi-block path the same way a
/// file would.
const CHUNK_CHARS: usize = 16 * 1024;

pub struct BytesStream {
    chars: Vec<char>,
    position: usize,
}

impl BytesStream {
    pub fn new(bytes: &[u8], encoding: Encoding) -> Result<Self> {
        let decoded = encoding::decode(bytes, encoding)?;
        let mut pending_newline = PendingNewline::None;
        let (collapsed, _) = collapse_newlines(&decoded, &mut pending_newline);
        Ok(BytesStream {
            chars: collapsed,
            position: 0,
        })
    }
}

impl Stream for BytesStream {
    fn next_buffer(&mut self) -> Result<(Vec<char>, BufferState)> {
        if self.position >= self.chars.len() {
            return Ok((Vec::new(), BufferState::EndOfFile));
        }
        let end = (self.position + CHUNK_CHARS).min(self.chars.len());
        let block = &self.chars[self.position..end];
        self.position = end;

        let state = if end == self.chars.len() {
            BufferState::EndOfFile
        } else if block.last() == Some(&'\n') {
            BufferState::NoNewlineInBuffer
        } else {
            BufferState::MayContainNewline
        };
        Ok((block.to_vec(), state))
    }

    fn close(&mut self, policy: ClosePolicy) -> Result<()> {
        if policy == ClosePolicy::RestoreInitialPosition {
            self.position = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_and_collapses_up_front() {
        let mut stream = BytesStream::new(b"1,2\r\n3,4\r\n", Encoding::Utf8).unwrap();
        let mut all = String::new();
        loop {
            let (chars, state) = stream.next_buffer().unwrap();
            all.extend(chars);
            if state == BufferState::EndOfFile {
                break;
            }
        }
        assert_eq!(all, "1,2\n3,4\n");
    }

    #[test]
    fn bad_encoding_fails_at_construction() {
        assert!(BytesStream::new(&[0xff, 0xfe], Encoding::Utf8).is_err());
    }

    #[test]
    fn restore_initial_position_rewinds() {
        let mut stream = BytesStream::new(b"a,b\n", Encoding::Utf8).unwrap();
        stream.next_buffer().unwrap();
        stream.close(ClosePolicy::RestoreInitialPosition).unwrap();
        let (chars, _) = stream.next_buffer().unwrap();
        assert_eq!(chars, vec!['a', ',', 'b', '\n']);
    }
}
