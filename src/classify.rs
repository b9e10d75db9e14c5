//! Email classification for CSV rows.
//!
//! This is a conservative syntactic check, not RFC 5322 validation: the goal is "does this row
//! plausibly contain an email address", applied to the row's fields joined with a single space.
//! Joining means an address split across adjacent cells can still match; that cross-field false
//! positive is an accepted tradeoff of the design.

use std::sync::LazyLock;

use regex::Regex;

/// Case-insensitive email-shaped pattern: local part, `@`, domain, dot, 2+ letter TLD label,
/// bounded by word boundaries.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+\-]+@[A-Z0-9.\-]+\.[A-Z]{2,}\b").expect("email regex is valid")
});

/// Returns true iff `text` contains an email-shaped substring.
///
/// A match that is immediately followed by a `.` in the original text is rejected
/// (`user@domain.com.` is not counted); later matches in the same text are still considered.
pub fn contains_email(text: &str) -> bool {
    EMAIL_RE
        .find_iter(text)
        .any(|m| text.as_bytes().get(m.end()) != Some(&b'.'))
}

/// Classify a whole record: fields are joined with a single space before matching.
pub fn record_has_email<S: AsRef<str>>(fields: &[S]) -> bool {
    let joined = fields
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    contains_email(&joined)
}
