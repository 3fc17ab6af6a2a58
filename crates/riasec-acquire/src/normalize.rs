use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize scraped text to NFC and collapse whitespace runs to one space.
///
/// HTML text nodes carry indentation, non-breaking spaces and stray tabs;
/// none of that belongs in a CSV cell.
pub fn normalize_text(input: &str) -> String {
    let nfc: String = input.nfc().collect();
    WHITESPACE_RUN.replace_all(nfc.trim(), " ").into_owned()
}

/// Last non-empty line of `text` after trimming the whole block.
pub fn last_line(text: &str) -> &str {
    text.trim().split('\n').last().unwrap_or_default().trim()
}
