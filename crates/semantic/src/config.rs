use serde::{Deserialize, Serialize};

use crate::SemanticError;

/// Settings for the optional semantic signal.
///
/// Disabled by default; the lexical scorer never depends on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// Compute `semantic_similarity` for scored pairs.
    pub enabled: bool,
    /// Friendly label surfaced on every [`SemanticEmbedding`](crate::SemanticEmbedding).
    pub model_name: String,
    /// Output dimension of the hashing embedder.
    pub dimension: usize,
    /// Normalize vectors to unit length.
    pub normalize: bool,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model_name: "hashing-bow-v1".into(),
            dimension: 256,
            normalize: true,
        }
    }
}

impl SemanticConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn validate(&self) -> Result<(), SemanticError> {
        if self.dimension == 0 {
            return Err(SemanticError::InvalidConfig(
                "dimension must be > 0".into(),
            ));
        }
        if self.model_name.trim().is_empty() {
            return Err(SemanticError::InvalidConfig(
                "model_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_disabled_and_valid() {
        let cfg = SemanticConfig::default();
        assert!(!cfg.enabled);
        assert_eq!(cfg.dimension, 256);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_dimension_rejected() {
        let cfg = SemanticConfig::default().with_dimension(0);
        assert!(matches!(cfg.validate(), Err(SemanticError::InvalidConfig(_))));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: SemanticConfig = serde_json::from_str(r#"{"enabled": true}"#).unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.model_name, "hashing-bow-v1");
    }
}
