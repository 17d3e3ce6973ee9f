//! Output of [`canonicalize`](crate::canonicalize).

use serde::{Deserialize, Serialize};

use crate::token::Token;

/// Normalized text together with its tokens and identity hash.
///
/// ```text
/// CanonicalizedDocument
/// ├── doc_id: String             # caller-supplied identifier
/// ├── normalized_text: String    # output of normalize_with
/// ├── tokens: Vec<Token>         # words with byte offsets
/// ├── content_hash: String       # SHA-256(version || 0x00 || text), hex
/// └── canonical_version: u32     # NormalizeConfig::version used
/// ```
///
/// ```rust
/// use canonical::{canonicalize, NormalizeConfig};
///
/// let doc = canonicalize("doc-1", "Hello World", &NormalizeConfig::default()).unwrap();
/// assert_eq!(doc.normalized_text, "hello world");
/// assert_eq!(doc.tokens[1].text, "world");
/// assert_eq!(doc.content_hash.len(), 64);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalizedDocument {
    pub doc_id: String,
    pub normalized_text: String,
    pub tokens: Vec<Token>,
    pub content_hash: String,
    pub canonical_version: u32,
}

impl CanonicalizedDocument {
    /// Number of words in the normalized text.
    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }

    /// Iterate over token texts in order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.text.as_str())
    }
}
