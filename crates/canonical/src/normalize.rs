use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_categories::UnicodeCategories;
use unicode_normalization::UnicodeNormalization;

use crate::config::NormalizeConfig;
use crate::document::CanonicalizedDocument;
use crate::error::CanonicalError;
use crate::hash::hash_canonical_bytes;
use crate::token::tokenize;
use crate::whitespace::collapse_whitespace;

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:https?://|www\.)\S+").expect("valid regex"));

/// Normalize text with the default configuration.
///
/// ```rust
/// use canonical::normalize;
///
/// assert_eq!(
///     normalize("## Smart **Plug** guide: see https://example.com/x!"),
///     "smart plug guide see"
/// );
/// assert_eq!(normalize("wi-fi  Ready"), "wi-fi ready");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    normalize_with(text, &NormalizeConfig::default())
}

/// Normalize text under an explicit configuration.
///
/// Steps, in order: NFKC, lowercase, URL removal, markup removal, then
/// whitespace collapsing. Hyphens and underscores survive so compound
/// terms such as `wi-fi` stay a single word.
pub fn normalize_with(text: &str, cfg: &NormalizeConfig) -> String {
    let unicode: Cow<str> = if cfg.normalize_unicode {
        Cow::Owned(text.nfkc().collect())
    } else {
        Cow::Borrowed(text)
    };

    let cased: Cow<str> = if cfg.lowercase {
        Cow::Owned(unicode.to_lowercase())
    } else {
        unicode
    };

    let without_urls: Cow<str> = if cfg.strip_urls {
        Cow::Owned(URL.replace_all(&cased, " ").into_owned())
    } else {
        cased
    };

    if !cfg.strip_markup {
        return collapse_whitespace(&without_urls);
    }

    let mut out = String::with_capacity(without_urls.len());
    for ch in without_urls.chars() {
        match ch {
            '#' | '*' | '`' | '[' | ']' | '(' | ')' => out.push(' '),
            '-' | '_' => out.push(ch),
            c if c.is_punctuation() || c.is_symbol() => out.push(' '),
            c => out.push(c),
        }
    }
    collapse_whitespace(&out)
}

/// Normalize `input` and bundle the result with its tokens and identity hash.
///
/// Unlike [`normalize`], this validates the configuration and requires a
/// non-empty id. Empty normalized text is allowed: downstream similarity
/// treats it as "no signal" rather than an error.
pub fn canonicalize(
    doc_id: impl Into<String>,
    input: &str,
    cfg: &NormalizeConfig,
) -> Result<CanonicalizedDocument, CanonicalError> {
    cfg.validate()?;

    let doc_id: String = doc_id.into();
    let doc_id = doc_id.trim();
    if doc_id.is_empty() {
        return Err(CanonicalError::MissingDocId);
    }

    let normalized_text = normalize_with(input, cfg);
    let tokens = tokenize(&normalized_text);
    let content_hash = hash_canonical_bytes(cfg.version, normalized_text.as_bytes());

    Ok(CanonicalizedDocument {
        doc_id: doc_id.to_string(),
        normalized_text,
        tokens,
        content_hash,
        canonical_version: cfg.version,
    })
}
