//! Shared utilities for channel implementations.

/// Split a long message into chunks that respect a platform's byte limit.
///
/// Boundaries are aligned to UTF-8 char boundaries (Cyrillic replies are
/// two bytes per letter). Prefers splitting right after a newline.
pub fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    if text.len() <= max_len {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // max_len is narrower than a single char; emit that char whole.
            end = start + 1;
            while !text.is_char_boundary(end) {
                end += 1;
            }
        }
        let break_at = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .map(|i| start + i + 1)
                .unwrap_or(end)
        } else {
            end
        };
        chunks.push(&text[start..break_at]);
        start = break_at;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_message() {
        assert_eq!(split_message("hello", 4096), vec!["hello"]);
    }

    #[test]
    fn test_split_prefers_newlines() {
        let text = "a\n".repeat(3000);
        let chunks = split_message(&text, 4096);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 4096);
            assert!(chunk.ends_with('\n'));
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_cyrillic_boundary() {
        let text = "\u{0411}".repeat(100);
        let chunks = split_message(&text, 151);
        for chunk in &chunks {
            assert!(chunk.len() <= 151);
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_emoji_wider_than_limit() {
        let text = "\u{1f680}".repeat(3);
        let chunks = split_message(&text, 2);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.concat(), text);
    }
}
