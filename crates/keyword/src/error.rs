use thiserror::Error;

/// Errors produced by the keyword layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeywordError {
    #[error("invalid keyword config: {0}")]
    InvalidConfig(String),

    /// Blank after trimming.
    #[error("keyword is empty")]
    EmptyKeyword,

    #[error("failed to access {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to encode record: {0}")]
    Encode(String),

    #[error("unknown angle axis '{0}'")]
    UnknownAxis(String),
}

impl KeywordError {
    pub(crate) fn io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        KeywordError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
