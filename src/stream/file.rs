// A stream backed by a file opened by path (§6.1: `TextSource::Path`).
// Reads raw bytes in fixed-size blocks through a `BufReader`, the same
// buffered-`Read` discipline the teacher's `StreamingParser::feed` assumes
// its caller drives it with, except here the read loop lives inside the
// stream instead of being left to the NIF caller.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::encoding::{self, Encoding};
use super::{collapse_newlines, BufferState, ClosePolicy, PendingNewline, Stream};
use crate::error::Result;

/// Bytes read per refill. Large enough to amortize syscall overhead, small
/// enough to keep peak memory bounded for huge files.
const CHUNK_BYTES: usize = 64 * 1024;

pub struct FileStream {
    reader: BufReader<File>,
    encoding: Encoding,
    /// Undecoded bytes left over from the previous chunk (a multi-byte
    /// character split across the chunk boundary).
    leftover: Vec<u8>,
    pending_newline: PendingNewline,
    initial_position: u64,
}

impl FileStream {
    pub fn open(path: impl AsRef<Path>, encoding: Encoding) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let initial_position = reader.stream_position()?;
        Ok(FileStream {
            reader,
            encoding,
            leftover: Vec::new(),
            pending_newline: PendingNewline::None,
            initial_position,
        })
    }
}

impl Stream for FileStream {
    fn next_buffer(&mut self) -> Result<(Vec<char>, BufferState)> {
        let mut chunk = vec![0u8; CHUNK_BYTES];
        let n = self.reader.read(&mut chunk)?;
        if n == 0 && self.leftover.is_empty() {
            return Ok((Vec::new(), BufferState::EndOfFile));
        }
        chunk.truncate(n);

        let mut pending = std::mem::take(&mut self.leftover);
        pending.extend_from_slice(&chunk);

        let eof = n == 0;
        let boundary = if eof {
            pending.len()
        } else {
            encoding::decodable_prefix(&pending, self.encoding)?
        };
        self.leftover = pending[boundary..].to_vec();

        let chars = encoding::decode(&pending[..boundary], self.encoding)?;
        let (collapsed, _) = collapse_newlines(&chars, &mut self.pending_newline);

        let state = if eof && self.leftover.is_empty() {
            BufferState::EndOfFile
        } else if collapsed.last() == Some(&'\n') {
            BufferState::NoNewlineInBuffer
        } else {
            BufferState::MayContainNewline
        };
        Ok((collapsed, state))
    }

    fn close(&mut self, policy: ClosePolicy) -> Result<()> {
        match policy {
            ClosePolicy::None => {}
            ClosePolicy::RestoreInitialPosition => {
                self.reader.seek(SeekFrom::Start(self.initial_position))?;
            }
            ClosePolicy::RestoreCurrentPosition => {
                // The reader is already positioned just past the last byte
                // consumed; nothing to do beyond leaving it alone.
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &[u8]) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("readtext_test_{:x}", contents.len() as u64 * 2654435761));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn reads_whole_small_file() {
        let path = write_temp(b"1,2,3\n4,5,6\n");
        let mut stream = FileStream::open(&path, Encoding::Utf8).unwrap();
        let mut all = String::new();
        loop {
            let (chars, state) = stream.next_buffer().unwrap();
            all.extend(chars);
            if state == BufferState::EndOfFile {
                break;
            }
        }
        assert_eq!(all, "1,2,3\n4,5,6\n");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn collapses_crlf_across_the_whole_file() {
        let path = write_temp(b"a,b\r\nc,d\r\n");
        let mut stream = FileStream::open(&path, Encoding::Utf8).unwrap();
        let mut all = String::new();
        loop {
            let (chars, state) = stream.next_buffer().unwrap();
            all.extend(chars);
            if state == BufferState::EndOfFile {
                break;
            }
        }
        assert_eq!(all, "a,b\nc,d\n");
        std::fs::remove_file(&path).ok();
    }
}
