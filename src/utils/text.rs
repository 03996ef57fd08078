// file: src/utils/text.rs
// description: display text helpers for truncation, html stripping and glyph removal
// reference: safe UTF-8 handling on char boundaries

use lazy_static::lazy_static;
use regex::Regex;

pub const ELLIPSIS: &str = "...";

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").expect("HTML_TAG regex is valid");
}

/// Truncates to `max_chars` characters and appends an ellipsis marker.
/// Returns the input unchanged when it already fits.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

pub fn strip_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

/// Removes pictographic decoration so a label can be exported as plain text.
pub fn strip_glyphs(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || c.is_ascii_punctuation())
        .collect::<String>()
        .trim()
        .to_string()
}
