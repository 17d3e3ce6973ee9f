//! Markdown and front-matter stripping.
//!
//! Prose is what gets compared. Fenced code, images, tables, HTML comments
//! and HTML tags are removed outright. Inline markup is reduced to the text it
//! decorates: headings, emphasis, links, list markers and blockquotes lose
//! their syntax, and inline code keeps its contents without the backticks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::whitespace::collapse_whitespace;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(```|~~~).*?(```|~~~)").expect("valid regex"));
static HTML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid regex"));
static TABLE_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\|.*$").expect("valid regex"));
static HORIZONTAL_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:-{3,}|\*{3,}|_{3,})[ \t]*$").expect("valid regex"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").expect("valid regex"));
static BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").expect("valid regex"));
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*+]|\d+\.)[ \t]+").expect("valid regex"));
static STRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*\*|__)([^*_\n]+)(\*\*|__)").expect("valid regex"));
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").expect("valid regex"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]*)`").expect("valid regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>\n]+>").expect("valid regex"));
static H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*$").expect("valid regex"));

/// Splits a leading `---` delimited front-matter block from the body.
///
/// Returns `(Some(front_matter), body)` when the text opens with a `---` line
/// that is closed by a later `---` line; otherwise `(None, text)`. The
/// delimiters themselves belong to neither part.
///
/// ```rust
/// use canonical::split_front_matter;
///
/// let (meta, body) = split_front_matter("---\ntitle: Plugs\n---\n# Body\n");
/// assert_eq!(meta, Some("title: Plugs\n"));
/// assert_eq!(body, "# Body\n");
///
/// let (meta, body) = split_front_matter("no front matter");
/// assert!(meta.is_none());
/// assert_eq!(body, "no front matter");
/// ```
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let trimmed = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(first_line_end) = trimmed.find('\n') else {
        return (None, text);
    };
    if trimmed[..first_line_end].trim_end() != "---" {
        return (None, text);
    }

    let meta_start = first_line_end + 1;
    let mut cursor = meta_start;
    while cursor <= trimmed.len() {
        let line_end = trimmed[cursor..]
            .find('\n')
            .map(|offset| cursor + offset)
            .unwrap_or(trimmed.len());
        if trimmed[cursor..line_end].trim_end() == "---" {
            let body_start = (line_end + 1).min(trimmed.len());
            return (Some(&trimmed[meta_start..cursor]), &trimmed[body_start..]);
        }
        if line_end == trimmed.len() {
            break;
        }
        cursor = line_end + 1;
    }
    (None, text)
}

/// Returns the text of the first level-one (`# `) heading, if any.
///
/// Fenced code is skipped so a `# comment` inside a shell snippet is never
/// mistaken for a title.
pub fn first_heading(markdown: &str) -> Option<String> {
    let without_code = CODE_FENCE.replace_all(markdown, "");
    H1.captures(&without_code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Reduces markdown to its prose.
///
/// ```rust
/// use canonical::strip_markdown;
///
/// let md = "# Title\n\n![hero](hero.png)\nSee [the guide](https://x.y) for **more**.\n\
/// | a | b |\n|---|---|\n```\ncode\n```\n";
/// assert_eq!(strip_markdown(md), "Title See the guide for more.");
/// ```
pub fn strip_markdown(markdown: &str) -> String {
    let text = CODE_FENCE.replace_all(markdown, " ");
    let text = HTML_COMMENT.replace_all(&text, " ");
    let text = IMAGE.replace_all(&text, " ");
    let text = LINK.replace_all(&text, "$1");
    let text = TABLE_ROW.replace_all(&text, "");
    let text = HORIZONTAL_RULE.replace_all(&text, "");
    let text = HEADING.replace_all(&text, "");
    let text = BLOCKQUOTE.replace_all(&text, "");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = STRONG.replace_all(&text, "$2");
    let text = EMPHASIS.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, " $1 ");
    let text = HTML_TAG.replace_all(&text, " ");
    collapse_whitespace(&text)
}
