// The row reader's output buffer: a contiguous byte array shaped
// `rows x row_size` (§3, §4.6). This stands in for "the target array
// allocator" that §1 names as an external collaborator — it has no dtype
// awareness beyond a byte stride, matching the spec's framing of the real
// array type as something outside this crate's scope.
//
// The growth discipline (speculative block sizing, 5/4 growth, single final
// trim) is the same shape as the teacher's `StreamingParser` buffer
// management in strategy/streaming.rs: grow eagerly while data keeps
// arriving, compact/trim only when the caller asks for the result.

/// Target minimum size, in bytes, of the first speculative allocation when
/// the row count is not known ahead of time (§4.3 step 4: "targets >= 8 KiB").
const SPECULATIVE_MIN_BYTES: usize = 8 * 1024;

/// A row-major byte buffer with a fixed row stride and a resizable row count.
pub struct OutputBuffer {
    data: Vec<u8>,
    row_size: usize,
    rows_written: usize,
    rows_allocated: usize,
}

impl OutputBuffer {
    /// Exact allocation for a known row count (`max_rows` was given).
    pub fn with_capacity_rows(row_size: usize, rows: usize) -> Self {
        let bytes = row_size.checked_mul(rows).unwrap_or(usize::MAX);
        OutputBuffer {
            data: vec![0u8; bytes],
            row_size,
            rows_written: 0,
            rows_allocated: rows,
        }
    }

    /// First block for an unbounded read: sized so `row_size * rows >= 8 KiB`,
    /// rounded up to a power-of-two row count of at least 1 (§4.3 step 4).
    pub fn with_speculative_capacity(row_size: usize) -> Self {
        let rows = speculative_row_count(row_size);
        OutputBuffer {
            data: vec![0u8; row_size.saturating_mul(rows)],
            row_size,
            rows_written: 0,
            rows_allocated: rows,
        }
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn rows_allocated(&self) -> usize {
        self.rows_allocated
    }

    /// Grows (5/4, rounded up to one block) if `row_index` has reached the
    /// current allocation (§9, "Growth strategy"). A no-op for exact
    /// (`max_rows`-bounded) allocations, since those never need to grow.
    pub fn ensure_row(&mut self, row_index: usize) {
        if row_index < self.rows_allocated {
            return;
        }
        let block = speculative_row_count(self.row_size).max(1);
        let grown = (self.rows_allocated * 5).div_ceil(4);
        let new_rows = grown.max(self.rows_allocated + 1);
        // Round up to the next multiple of the original block size so the
        // amortised growth factor stays close to 5/4 across many grow steps.
        let new_rows = new_rows.div_ceil(block) * block;
        self.data.resize(self.row_size * new_rows, 0);
        self.rows_allocated = new_rows;
    }

    /// Row `index`'s byte range, writable by a converter.
    pub fn row_mut(&mut self, index: usize) -> &mut [u8] {
        let start = index * self.row_size;
        let end = start + self.row_size;
        if self.rows_written <= index {
            self.rows_written = index + 1;
        }
        &mut self.data[start..end]
    }

    /// Single reallocation down to the rows actually written (§4.3 step 7).
    pub fn into_trimmed(mut self, rows_written: usize) -> Vec<u8> {
        self.data.truncate(self.row_size * rows_written);
        self.data.shrink_to_fit();
        self.data
    }
}

fn speculative_row_count(row_size: usize) -> usize {
    if row_size == 0 {
        return 1;
    }
    let mut rows = 1usize;
    while rows * row_size < SPECULATIVE_MIN_BYTES {
        rows = rows.saturating_mul(2);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speculative_capacity_targets_at_least_8kib() {
        let buf = OutputBuffer::with_speculative_capacity(24);
        assert!(buf.rows_allocated() * 24 >= 8 * 1024);
        // power of two
        assert_eq!(buf.rows_allocated() & (buf.rows_allocated() - 1), 0);
    }

    #[test]
    fn exact_capacity_matches_requested_rows() {
        let buf = OutputBuffer::with_capacity_rows(16, 5);
        assert_eq!(buf.rows_allocated(), 5);
        assert_eq!(buf.into_trimmed(5).len(), 80);
    }

    #[test]
    fn ensure_row_grows_when_exhausted() {
        let mut buf = OutputBuffer::with_capacity_rows(8, 2);
        buf.ensure_row(0);
        buf.ensure_row(1);
        assert_eq!(buf.rows_allocated(), 2);
        buf.ensure_row(2);
        assert!(buf.rows_allocated() > 2);
    }

    #[test]
    fn trim_shrinks_to_rows_written() {
        let mut buf = OutputBuffer::with_speculative_capacity(8);
        for i in 0..3 {
            buf.ensure_row(i);
            buf.row_mut(i)[0] = i as u8;
        }
        let trimmed = buf.into_trimmed(3);
        assert_eq!(trimmed.len(), 24);
        assert_eq!(trimmed[0], 0);
        assert_eq!(trimmed[8], 1);
        assert_eq!(trimmed[16], 2);
    }
}
