//! Per-file failure taxonomy.
//!
//! None of these escape `parse`/`parse_many`: they are rendered into
//! [`crate::model::ParseResult::error`]. Unresolved references are not errors
//! and have no variant here.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No builder exists for the requested or detected language.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Source bytes could not be obtained.
    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("file too large: {size} bytes exceeds limit of {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("file is not valid UTF-8 (invalid byte at offset {offset})")]
    NotUtf8 { offset: usize },

    /// The grammar for a known language could not be loaded.
    #[error("grammar unavailable for {language}: {reason}")]
    GrammarUnavailable { language: String, reason: String },

    /// The tree is unusable as a whole.
    #[error("syntax error: {0}")]
    Syntax(String),
}

impl ParseError {
    pub fn unreadable(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Unreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Input-side failures (as opposed to grammar or tree failures).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Unreadable { .. } | Self::TooLarge { .. } | Self::NotUtf8 { .. }
        )
    }
}
