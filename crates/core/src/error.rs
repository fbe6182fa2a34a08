//! Error types for the BPE tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Error loading a saved model
    #[error("Load error: {0}")]
    Load(String),

    /// Error saving a trained model
    #[error("Save error: {0}")]
    Save(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The word pattern or special-token alternation failed to compile or match
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// A byte string that should be in the vocabulary is not
    #[error("Unknown token: {0:?}")]
    UnknownToken(Vec<u8>),

    /// A special token was matched in the input but has no vocabulary ID
    #[error("Special token {0:?} has no vocabulary entry")]
    UnknownSpecialToken(String),

    /// Invalid merge rule
    #[error("Invalid merge rule: {0}")]
    InvalidMerge(String),
}

impl From<fancy_regex::Error> for TokenizerError {
    fn from(err: fancy_regex::Error) -> Self {
        TokenizerError::Pattern(err.to_string())
    }
}

impl From<regex::Error> for TokenizerError {
    fn from(err: regex::Error) -> Self {
        TokenizerError::Pattern(err.to_string())
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
