//! Deterministic truncation used to bound prompt size.

/// Keep at most `max_chars` characters of `text`. Plain prefix cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Keep the first `max_words` whitespace-separated words, joined by single spaces.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Short single-line preview for logs.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    let cut = head.len() < text.len();
    let head = head.replace('\n', "\\n");
    if cut { format!("{}...", head) } else { head }
}
