//! Utility functions for text slicing and message splitting.

use unicode_segmentation::UnicodeSegmentation;

/// Safely truncates a string to a maximum character length (not bytes).
///
/// This is UTF-8 safe and will not panic on multi-byte characters.
///
/// # Examples
///
/// ```
/// use oxide_tutor_core::utils::truncate_str;
/// let s = "Привет, мир!";
/// assert_eq!(truncate_str(s, 6), "Привет");
/// ```
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Returns the substring covering `length` characters starting at character
/// `offset`, clamped to the bounds of `text`.
///
/// # Examples
///
/// ```
/// use oxide_tutor_core::utils::char_span;
/// assert_eq!(char_span("I has a apple", 2, 3), "has");
/// assert_eq!(char_span("short", 3, 10), "rt");
/// assert_eq!(char_span("short", 10, 2), "");
/// ```
#[must_use]
pub fn char_span(text: &str, offset: usize, length: usize) -> &str {
    let mut indices = text.char_indices().map(|(pos, _)| pos).chain([text.len()]);
    let Some(start) = indices.nth(offset) else {
        return "";
    };
    let end = if length == 0 {
        start
    } else {
        indices.nth(length - 1).unwrap_or(text.len())
    };
    &text[start..end]
}

/// Splits a message into parts no longer than `max_chars` characters.
///
/// Lines are kept whole where possible; a single line longer than the limit
/// is cut on grapheme cluster boundaries.
///
/// # Examples
///
/// ```
/// use oxide_tutor_core::utils::split_long_message;
/// let long_msg = "A very long message...\n".repeat(300);
/// let parts = split_long_message(&long_msg, 4000);
/// assert!(parts.len() > 1);
/// ```
#[must_use]
pub fn split_long_message(message: &str, max_chars: usize) -> Vec<String> {
    if message.is_empty() {
        return Vec::new();
    }
    if message.chars().count() <= max_chars {
        return vec![message.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in message.lines() {
        let line_len = line.chars().count();

        if line_len > max_chars {
            if !current.is_empty() {
                parts.push(current.trim_end().to_string());
                current.clear();
                current_len = 0;
            }
            let mut chunk = String::new();
            let mut chunk_len = 0;
            for grapheme in line.graphemes(true) {
                let grapheme_len = grapheme.chars().count();
                if chunk_len + grapheme_len > max_chars {
                    parts.push(std::mem::take(&mut chunk));
                    chunk_len = 0;
                }
                chunk.push_str(grapheme);
                chunk_len += grapheme_len;
            }
            if !chunk.is_empty() {
                current = chunk;
                current.push('\n');
                current_len = chunk_len + 1;
            }
            continue;
        }

        if current_len + line_len + 1 > max_chars && !current.is_empty() {
            parts.push(current.trim_end().to_string());
            current.clear();
            current_len = 0;
        }
        current.push_str(line);
        current.push('\n');
        current_len += line_len + 1;
    }

    if !current.trim().is_empty() {
        parts.push(current.trim_end().to_string());
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_unicode() {
        let s = "Привет, мир!";
        assert_eq!(truncate_str(s, 6), "Привет");
        assert_eq!(truncate_str(s, 50), "Привет, мир!");
    }

    #[test]
    fn test_char_span_multibyte() {
        assert_eq!(char_span("Привет мир", 7, 3), "мир");
        assert_eq!(char_span("abc", 0, 0), "");
        assert_eq!(char_span("abc", 3, 1), "");
        assert_eq!(char_span("", 0, 5), "");
    }

    #[test]
    fn test_split_respects_limit() {
        let text = "line one\nline two\nline three\n".repeat(50);
        let parts = split_long_message(&text, 100);
        assert!(parts.len() > 1);
        for part in &parts {
            assert!(part.chars().count() <= 100, "part too long: {}", part.len());
        }
    }

    #[test]
    fn test_split_long_single_line() {
        let text = "ж".repeat(250);
        let parts = split_long_message(&text, 100);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.chars().count() <= 100));
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_split_short_message_untouched() {
        assert_eq!(split_long_message("hi", 10), vec!["hi".to_string()]);
        assert!(split_long_message("", 10).is_empty());
    }
}
