// file: src/extractor/patterns.rs
// description: compiled regex patterns for indicator extraction
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Dotted quad of 1-3 ASCII digit groups with ASCII word boundaries.
    /// Octet ranges are not checked.
    pub static ref IPV4_SHAPED: Regex = Regex::new(
        r"(?-u:\b)(?:[0-9]{1,3}\.){3}[0-9]{1,3}(?-u:\b)"
    ).expect("IPV4_SHAPED regex is valid");
}

/// First IPv4-shaped substring of `text`.
pub fn find_ipv4(text: &str) -> Option<&str> {
    IPV4_SHAPED.find(text).map(|m| m.as_str())
}
