//! Shared utility functions for diagnostics and common operations.
//!
//! - `truncate_chars` - Char-boundary-safe prefix used for diagnostic lines

// =============================================================================
// Diagnostic Helpers
// =============================================================================

/// Return at most `max_chars` characters of `text`.
///
/// Counts `char`s rather than bytes so multi-byte output from agents is never
/// split in the middle of a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// First `max_chars` characters of the trimmed text, or a fallback when empty.
pub fn diagnostic_line(text: &str, max_chars: usize, fallback: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        truncate_chars(trimmed, max_chars).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn test_truncate_chars_cuts_on_char_boundary() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        // Multi-byte characters count as one each
        assert_eq!(truncate_chars("量子物理教程", 2), "量子");
    }

    #[test]
    fn test_diagnostic_line_fallback() {
        assert_eq!(diagnostic_line("   \n", 10, "no output"), "no output");
        assert_eq!(diagnostic_line("  boom  ", 10, "no output"), "boom");
    }
}
