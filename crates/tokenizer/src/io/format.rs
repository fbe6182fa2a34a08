//! Format definitions for tokenizer serialization.
//!
//! A model is stored as a single `tokenizer.json`. Token contents are byte
//! arrays, since merged tokens need not be valid UTF-8; a readable `text`
//! field is added for entries that are.

use bytebpe_core::{MergeRules, SpecialTokens};
use serde::{Deserialize, Serialize};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// File name inside the model directory.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// One vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedToken {
    /// Token ID
    pub id: u32,
    /// Raw token bytes
    pub bytes: Vec<u8>,
    /// UTF-8 rendering, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SerializedToken {
    /// Create an entry, filling `text` when the bytes are valid UTF-8.
    pub fn new(id: u32, bytes: &[u8]) -> Self {
        Self {
            id,
            bytes: bytes.to_vec(),
            text: std::str::from_utf8(bytes).ok().map(str::to_owned),
        }
    }
}

/// Complete tokenizer serialization format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedTokenizer {
    /// Format version
    pub version: u32,
    /// Vocabulary entries in ID order
    pub vocab: Vec<SerializedToken>,
    /// Merge rules in priority order
    pub merges: MergeRules,
    /// Special tokens
    pub special_tokens: SpecialTokens,
    /// Summary of the model
    pub config: SerializedConfig,
}

/// Tokenizer summary in serialized format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedConfig {
    pub vocab_size: usize,
    pub num_merges: usize,
    pub pattern: String,
}
