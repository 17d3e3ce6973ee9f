//! Text normalization layer for dupgate.
//!
//! Every comparison downstream (SimHash, term vectors, title Jaccard, content
//! hashes) runs over text produced here, so two inputs that differ only in
//! markup, casing, Unicode representation or spacing compare as equal.
//!
//! ## What we do
//!
//! - Front-matter splitting and first-heading extraction
//! - Markdown reduction to prose (code fences, images, tables removed)
//! - Unicode NFKC, lowercasing, URL and punctuation stripping
//! - Whitespace collapsing and word tokenization with byte offsets
//! - Versioned SHA-256 content hashes for exact-duplicate detection
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence. Same text and config give
//! the same output on any machine.

mod config;
mod document;
mod error;
mod hash;
mod markup;
mod normalize;
mod token;
mod whitespace;

pub use crate::config::NormalizeConfig;
pub use crate::document::CanonicalizedDocument;
pub use crate::error::CanonicalError;
pub use crate::hash::{hash_canonical_bytes, hash_text};
pub use crate::markup::{first_heading, split_front_matter, strip_markdown};
pub use crate::normalize::{canonicalize, normalize, normalize_with};
pub use crate::token::{tokenize, word_count, Token};
pub use crate::whitespace::collapse_whitespace;
