//! Keyword-coverage topic classification.

use indexmap::IndexMap;
use ingest::Document;

use crate::DetectionConfig;

/// Assigns at most one topic to a document.
///
/// A topic's score is the fraction of its keywords found (case-insensitive
/// substring) in `title + " " + content`. The best score wins when it exceeds
/// `min_coverage`; ties go to the topic declared first.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicClassifier {
    topics: IndexMap<String, Vec<String>>,
    min_coverage: f64,
}

impl TopicClassifier {
    pub fn new(topics: IndexMap<String, Vec<String>>, min_coverage: f64) -> Self {
        let topics = topics
            .into_iter()
            .map(|(name, keywords)| {
                let keywords = keywords
                    .into_iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect::<Vec<_>>();
                (name, keywords)
            })
            .filter(|(_, keywords)| !keywords.is_empty())
            .collect();
        Self {
            topics,
            min_coverage,
        }
    }

    /// `None` when the config declares no topics.
    pub fn from_config(config: &DetectionConfig) -> Option<Self> {
        let classifier = Self::new(config.topics.clone(), config.min_topic_coverage);
        (!classifier.is_empty()).then_some(classifier)
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn classify(&self, title: &str, content: &str) -> Option<&str> {
        let haystack = format!("{title} {content}").to_lowercase();
        let mut best: Option<(&str, f64)> = None;
        for (name, keywords) in &self.topics {
            let hits = keywords.iter().filter(|k| haystack.contains(k.as_str())).count();
            let coverage = hits as f64 / keywords.len() as f64;
            match best {
                Some((_, top)) if coverage <= top => {}
                _ => best = Some((name.as_str(), coverage)),
            }
        }
        best.filter(|(_, coverage)| *coverage > self.min_coverage)
            .map(|(name, _)| name)
    }

    pub fn classify_document(&self, doc: &Document) -> Option<&str> {
        self.classify(&doc.title, &doc.content_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> TopicClassifier {
        let mut topics = IndexMap::new();
        topics.insert(
            "smart-home".to_string(),
            vec!["Smart Plug".into(), "thermostat".into(), "alexa".into()],
        );
        topics.insert(
            "kitchen".to_string(),
            vec!["oven".into(), "air fryer".into(), "blender".into()],
        );
        topics.insert("empty".to_string(), vec!["  ".into()]);
        TopicClassifier::new(topics, 0.1)
    }

    #[test]
    fn best_coverage_wins() {
        let c = classifier();
        assert_eq!(
            c.classify("Alexa thermostats", "pair a smart plug"),
            Some("smart-home")
        );
        assert_eq!(c.classify("Air fryer vs oven", ""), Some("kitchen"));
    }

    #[test]
    fn ties_resolve_by_declaration_order() {
        let c = classifier();
        assert_eq!(c.classify("oven", "alexa"), Some("smart-home"));
    }

    #[test]
    fn below_coverage_is_unclassified() {
        let c = classifier();
        assert_eq!(c.classify("gardening", "tomatoes"), None);

        let mut topics = IndexMap::new();
        topics.insert(
            "wide".to_string(),
            (0..20).map(|i| format!("kw{i}x")).collect::<Vec<_>>(),
        );
        let strict = TopicClassifier::new(topics, 0.1);
        // 2 of 20 keywords is exactly 0.1, which does not exceed the floor.
        assert_eq!(strict.classify("kw1x kw2x", ""), None);
        assert_eq!(strict.classify("kw1x kw2x kw3x", ""), Some("wide"));
    }

    #[test]
    fn empty_keyword_lists_are_dropped() {
        let c = classifier();
        assert!(!c.is_empty());
        assert!(TopicClassifier::from_config(&DetectionConfig::default()).is_none());
    }
}
