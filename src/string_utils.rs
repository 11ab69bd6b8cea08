//! UTF-8 safe string helpers
//!
//! Editor columns are byte offsets within a line. A host can hand us any
//! column (a stale cursor, a column counted in another unit), so every
//! column is snapped to a character boundary before slicing.

/// Returns the largest index that is less than or equal to `index`
/// and is on a UTF-8 character boundary.
///
/// If `index` is greater than the string length, returns the string length.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Split text into lines on `\r\n`, `\r` and `\n`.
///
/// Unlike [`str::lines`], a trailing separator yields a trailing empty
/// line and a lone `\r` counts as a break, which is how the editing
/// surface splits inserted text.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&text[start..]);
    lines
}
