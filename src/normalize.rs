//! Text normalization for feed-supplied fields.
//!
//! Feed titles, summaries, and content bodies arrive as arbitrary HTML
//! fragments. [`clean`] reduces them to plain text with single-space
//! separation; [`truncate_chars`] enforces the storage field limits after
//! normalization. Both are total functions — malformed markup never errors.

/// Render width handed to html2text. The output is whitespace-collapsed
/// afterwards, so the exact value only needs to be wide enough to avoid
/// degenerate wrapping of long words.
const RENDER_WIDTH: usize = 400;

/// Strip markup from feed-supplied text and collapse whitespace.
///
/// The input is parsed as HTML; script and style elements contribute no
/// visible text. All whitespace runs (including newlines introduced by
/// block layout) collapse to single spaces, and the result is trimmed.
/// Empty or blank input yields an empty string. If HTML rendering fails,
/// the input is treated as plain text and only whitespace-collapsed.
pub fn clean(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let text = html2text::config::plain()
        .string_from_read(raw.as_bytes(), RENDER_WIDTH)
        .unwrap_or_else(|_| raw.to_string());

    collapse_whitespace(&text)
}

/// Collapse every whitespace run to a single space and trim the ends.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string to at most `max` characters, respecting char boundaries.
///
/// Counts `char`s, not bytes, so multi-byte text is never split mid-codepoint.
/// Truncation runs after [`clean`], matching the stored field limits exactly.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
