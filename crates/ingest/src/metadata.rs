//! Front matter and title resolution.

use serde_yaml::{Mapping, Value};
use tracing::warn;

/// Keys consulted for the declared date, in priority order.
pub(crate) const DATE_KEYS: [&str; 4] = ["date", "created", "published", "publish_date"];

/// The front-matter fields the analyzer uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FrontMatter {
    pub title: Option<String>,
    /// Raw value of the first present date key.
    pub date: Option<String>,
    pub topic: Option<String>,
}

impl FrontMatter {
    /// Parses a YAML block. Malformed YAML or a non-mapping document yields
    /// empty metadata and a warning.
    pub fn parse(block: Option<&str>, source: &str) -> Self {
        let Some(block) = block else {
            return Self::default();
        };
        if block.trim().is_empty() {
            return Self::default();
        }
        let mapping = match serde_yaml::from_str::<Value>(block) {
            Ok(Value::Mapping(mapping)) => mapping,
            Ok(Value::Null) => return Self::default(),
            Ok(_) => {
                warn!(source, "front_matter_not_a_mapping");
                return Self::default();
            }
            Err(err) => {
                warn!(source, error = %err, "front_matter_malformed");
                return Self::default();
            }
        };

        Self {
            title: scalar(&mapping, "title"),
            date: DATE_KEYS.iter().find_map(|key| scalar(&mapping, key)),
            topic: scalar(&mapping, "topic").or_else(|| scalar(&mapping, "category")),
        }
    }
}

fn scalar(mapping: &Mapping, key: &str) -> Option<String> {
    let text = match mapping.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// `"my-first_post"` becomes `"My First Post"`.
pub(crate) fn title_from_stem(stem: &str) -> String {
    stem.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title priority: front-matter title, first `# ` heading, then the stem.
pub(crate) fn resolve_title(front: &FrontMatter, body: &str, stem: &str) -> String {
    if let Some(title) = &front.title {
        return title.clone();
    }
    if let Some(heading) = canonical::first_heading(body) {
        return heading;
    }
    title_from_stem(stem)
}
