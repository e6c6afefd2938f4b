// Fixed-width string converters (§4.4, "Byte string" / "Wide string").
// Neither has the "leading/trailing whitespace skipped, partial parse is
// an error" contract the numeric converters share — a string field is
// copied verbatim, just truncated or padded to the declared width.

use super::{ConvertError, ConvertResult};

/// Copies up to `width` codepoints as single bytes, rejecting any
/// codepoint above 255 (§4.4: "rejecting any value > 255"); pads the
/// remainder with NULs.
pub fn convert_bytes(field: &[char], width: usize, out: &mut [u8]) -> ConvertResult<()> {
    debug_assert_eq!(out.len(), width);
    let take = field.len().min(width);
    for (slot, &c) in out[..take].iter_mut().zip(&field[..take]) {
        let code = c as u32;
        if code > 255 {
            return Err(ConvertError);
        }
        *slot = code as u8;
    }
    for slot in &mut out[take..] {
        *slot = 0;
    }
    Ok(())
}

/// Copies up to `width` codepoints verbatim as 4-byte values, padding the
/// remainder with zeros (§4.4: "Wide string"). Byte order is handled by the
/// caller via the shared `maybe_swap` helper.
pub fn convert_wide(field: &[char], width: usize, out: &mut [u8]) -> ConvertResult<()> {
    debug_assert_eq!(out.len(), width * 4);
    let take = field.len().min(width);
    for (slot, &c) in out.chunks_mut(4).zip(&field[..take]) {
        slot.copy_from_slice(&(c as u32).to_ne_bytes());
    }
    for slot in out[take * 4..].chunks_mut(4) {
        slot.copy_from_slice(&0u32.to_ne_bytes());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn bytes_pads_with_nul() {
        let mut out = [0xffu8; 8];
        convert_bytes(&chars("a,b"), 8, &mut out).unwrap();
        assert_eq!(&out, b"a,b\0\0\0\0");
    }

    #[test]
    fn bytes_truncates_to_width() {
        let mut out = [0u8; 2];
        convert_bytes(&chars("abcdef"), 2, &mut out).unwrap();
        assert_eq!(&out, b"ab");
    }

    #[test]
    fn latin1_range_codepoints_are_accepted() {
        let mut out = [0u8; 1];
        convert_bytes(&chars("\u{00e9}"), 1, &mut out).unwrap();
        assert_eq!(out[0], 0xe9);
    }

    #[test]
    fn bytes_rejects_codepoints_above_255() {
        let mut out = [0u8; 1];
        assert!(convert_bytes(&chars("\u{20ac}"), 1, &mut out).is_err());
    }

    #[test]
    fn wide_pads_with_zero_codepoints() {
        let mut out = [0xffu8; 12];
        convert_wide(&chars("ab"), 3, &mut out).unwrap();
        let words: Vec<u32> = out.chunks(4).map(|c| u32::from_ne_bytes(c.try_into().unwrap())).collect();
        assert_eq!(words, vec!['a' as u32, 'b' as u32, 0]);
    }
}
