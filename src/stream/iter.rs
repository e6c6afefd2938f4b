// A stream backed by an iterable of line strings (§6.1: `TextSource::Lines`).
// Each item becomes one buffer; the caller's iterator has already done
// whatever line-splitting it wants, so this stream's only job is codepoint
// conversion and newline collapsing — useful for feeding readtext from
// something that isn't a flat file, e.g. a decompressed stream or a list of
// strings already held in memory.

use super::{collapse_newlines, BufferState, ClosePolicy, PendingNewline, Stream};
use crate::error::Result;

pub struct IterStream {
    lines: Box<dyn Iterator<Item = String> + Send>,
    pending_newline: PendingNewline,
}

impl IterStream {
    pub fn new(lines: impl Iterator<Item = String> + Send + 'static) -> Self {
        IterStream {
            lines: Box::new(lines),
            pending_newline: PendingNewline::None,
        }
    }
}

impl Stream for IterStream {
    fn next_buffer(&mut self) -> Result<(Vec<char>, BufferState)> {
        let Some(line) = self.lines.next() else {
            return Ok((Vec::new(), BufferState::EndOfFile));
        };
        let mut chars: Vec<char> = line.chars().collect();
        // The source iterator may or may not include a trailing terminator;
        // supply one so the tokenizer always sees a line boundary.
        if chars.last() != Some(&'\n') && chars.last() != Some(&'\r') {
            chars.push('\n');
        }
        let (collapsed, _) = collapse_newlines(&chars, &mut self.pending_newline);
        Ok((collapsed, BufferState::NoNewlineInBuffer))
    }

    fn close(&mut self, _policy: ClosePolicy) -> Result<()> {
        // Nothing to rewind: an arbitrary iterator is not seekable.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_item_becomes_one_terminated_line() {
        let mut stream = IterStream::new(
            vec!["1,2,3".to_string(), "4,5,6".to_string()].into_iter(),
        );
        let (first, state) = stream.next_buffer().unwrap();
        assert_eq!(first, vec!['1', ',', '2', ',', '3', '\n']);
        assert_eq!(state, BufferState::NoNewlineInBuffer);
        let (second, _) = stream.next_buffer().unwrap();
        assert_eq!(second, vec!['4', ',', '5', ',', '6', '\n']);
        let (third, state) = stream.next_buffer().unwrap();
        assert!(third.is_empty());
        assert_eq!(state, BufferState::EndOfFile);
    }

    #[test]
    fn existing_terminator_is_not_duplicated() {
        let mut stream = IterStream::new(vec!["a,b\n".to_string()].into_iter());
        let (chars, _) = stream.next_buffer().unwrap();
        assert_eq!(chars, vec!['a', ',', 'b', '\n']);
    }
}
