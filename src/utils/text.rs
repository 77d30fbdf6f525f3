// src/utils/text.rs
//! Character-based slicing helpers. Extraction windows are measured in
//! characters, while regex offsets are bytes.

/// Number of characters before byte offset `byte_pos`.
pub fn char_offset(text: &str, byte_pos: usize) -> usize {
    text[..byte_pos].chars().count()
}

/// Up to `max_chars` characters ending at byte offset `end`.
/// Returns the slice together with its starting byte offset.
pub fn window_before(text: &str, end: usize, max_chars: usize) -> (usize, &str) {
    if max_chars == 0 {
        return (end, "");
    }
    let head = &text[..end];
    let start = head
        .char_indices()
        .rev()
        .nth(max_chars - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    (start, &head[start..])
}

/// Up to `max_chars` characters starting at byte offset `start`.
pub fn window_after(text: &str, start: usize, max_chars: usize) -> &str {
    let tail = &text[start..];
    let end = tail
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    &tail[..end]
}

/// True when upper-casing leaves the text unchanged (digits and punctuation count as upper).
pub fn is_upper_text(text: &str) -> bool {
    text.to_uppercase() == text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_respect_multibyte_chars() {
        let text = "ÇÃO abc";
        let (start, before) = window_before(text, text.len(), 5);
        assert_eq!(before, "O abc");
        assert_eq!(&text[start..], "O abc");
        assert_eq!(window_after(text, 0, 2), "ÇÃ");
        assert_eq!(window_after(text, 0, 100), text);
        assert_eq!(window_before(text, 2, 100).1, "Ç");
    }

    #[test]
    fn test_char_offset_counts_chars() {
        let text = "ção R$";
        let pos = text.find("R$").unwrap();
        assert_eq!(char_offset(text, pos), 4);
    }

    #[test]
    fn test_is_upper_text() {
        assert!(is_upper_text("CRONOGRAMA 2024"));
        assert!(is_upper_text("INSCRIÇÃO"));
        assert!(!is_upper_text("texto A"));
    }
}
