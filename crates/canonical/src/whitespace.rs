//! Whitespace normalization.
//!
//! ```rust
//! use canonical::collapse_whitespace;
//!
//! assert_eq!(collapse_whitespace("  hello \t\n world  "), "hello world");
//! assert_eq!(collapse_whitespace("hello\u{00A0}world"), "hello world");
//! assert_eq!(collapse_whitespace("   "), "");
//! ```

/// Collapses every run of Unicode whitespace into a single ASCII space and
/// trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}
