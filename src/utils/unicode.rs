//! Unicode-safe helpers for editing UTF-8 lines by character position.

use unicode_width::UnicodeWidthStr;

/// Convert a character index (0-based) to a byte index in the given string.
/// If `n` exceeds the number of characters, returns `s.len()`.
pub fn char_to_byte_index(s: &str, n: usize) -> usize {
    match s.char_indices().nth(n) {
        Some((i, _)) => i,
        None => s.len(),
    }
}

/// Terminal columns taken by the first `n` characters of `s`.
pub fn display_width_to(s: &str, n: usize) -> usize {
    s[..char_to_byte_index(s, n)].width()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_index_maps_to_byte_boundary() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[test]
    fn width_counts_wide_characters() {
        assert_eq!(display_width_to("ab", 2), 2);
        assert_eq!(display_width_to("日本", 1), 2);
    }
}
