//! Offset conversion helpers.
//!
//! Core offsets are in Unicode scalar values (chars). Browser APIs report
//! UTF-16 code units, Rust slices want bytes; these helpers convert between
//! the three. Out-of-range inputs clamp to the end of the string.

/// Length in chars.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Convert a char offset to a byte offset, clamping to `s.len()`.
pub fn char_to_byte(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

/// Convert a byte offset to a char offset. The byte offset must lie on a
/// char boundary; otherwise the containing char is counted.
pub fn byte_to_char(s: &str, byte_offset: usize) -> usize {
    s.char_indices()
        .take_while(|(byte, _)| *byte < byte_offset)
        .count()
}

/// Convert a UTF-16 code unit offset to a char offset.
///
/// An offset that lands in the middle of a surrogate pair snaps forward to
/// the end of that char.
pub fn utf16_to_char(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (idx, c) in s.chars().enumerate() {
        if units >= utf16_offset {
            return idx;
        }
        units += c.len_utf16();
    }
    char_len(s)
}

/// Convert a char offset to a UTF-16 code unit offset.
pub fn char_to_utf16(s: &str, char_offset: usize) -> usize {
    s.chars().take(char_offset).map(char::len_utf16).sum()
}

/// Replace the char range `start..start + len` with `replacement`.
///
/// Returns None if the range runs past the end of `s`.
pub fn splice(s: &str, start: usize, len: usize, replacement: &str) -> Option<String> {
    if start + len > char_len(s) {
        return None;
    }
    let from = char_to_byte(s, start);
    let to = char_to_byte(s, start + len);
    let mut out = String::with_capacity(s.len() - (to - from) + replacement.len());
    out.push_str(&s[..from]);
    out.push_str(replacement);
    out.push_str(&s[to..]);
    Some(out)
}
