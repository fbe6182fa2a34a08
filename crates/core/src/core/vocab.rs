//! Vocabulary storage and lookup.
//!
//! The vocabulary is an append-only arena of byte strings indexed by token ID.
//! IDs 0-255 are the raw bytes, followed by merge results in creation order,
//! followed by special tokens. A reverse `AHashMap` resolves content back to
//! an ID; when two IDs share the same content the most recent one wins.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Number of base byte symbols.
pub const BYTE_VOCAB_SIZE: usize = 256;

/// Reverse mapping: token bytes -> ID
pub type Vocab = AHashMap<Box<[u8]>, u32>;

/// Forward mapping: ID -> token bytes (the arena itself)
pub type VocabR = Vec<Box<[u8]>>;

/// Vocabulary with an ID-indexed arena and a content lookup.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    /// ID -> token bytes
    entries: VocabR,
    /// Token bytes -> latest ID with that content
    lookup: Vocab,
}

impl Vocabulary {
    /// Create a new empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new vocabulary with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VocabR::with_capacity(capacity),
            lookup: Vocab::with_capacity(capacity),
        }
    }

    /// Create a vocabulary holding the 256 single-byte tokens at IDs 0-255.
    pub fn with_base_bytes() -> Self {
        let mut vocab = Self::with_capacity(BYTE_VOCAB_SIZE);
        for byte in 0..=u8::MAX {
            vocab.push(&[byte]);
        }
        vocab
    }

    /// Rebuild a vocabulary from entries listed in ID order.
    pub fn from_entries<I, B>(entries: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut vocab = Self::new();
        for entry in entries {
            vocab.push(entry.as_ref());
        }
        vocab
    }

    /// Append a token and return its newly assigned ID.
    ///
    /// Content is not deduplicated: pushing existing bytes creates a second ID,
    /// which then becomes the target of reverse lookups.
    pub fn push(&mut self, token: &[u8]) -> u32 {
        let id = self.entries.len() as u32;
        let token: Box<[u8]> = token.into();
        self.lookup.insert(token.clone(), id);
        self.entries.push(token);
        id
    }

    /// Append the concatenation of two existing tokens.
    pub fn push_merge(&mut self, left: u32, right: u32) -> Result<u32> {
        let merged = match (self.get_bytes(left), self.get_bytes(right)) {
            (Some(a), Some(b)) => [a, b].concat(),
            _ => {
                return Err(TokenizerError::InvalidMerge(format!(
                    "cannot merge ({}, {}): vocabulary has {} entries",
                    left,
                    right,
                    self.len()
                )))
            }
        };

        Ok(self.push(&merged))
    }

    /// Append a special token as its UTF-8 bytes.
    pub fn push_special(&mut self, token: &str) -> u32 {
        self.push(token.as_bytes())
    }

    /// Get the ID for a byte string.
    #[inline]
    pub fn get_id(&self, token: &[u8]) -> Option<u32> {
        self.lookup.get(token).copied()
    }

    /// Get the byte string for an ID.
    #[inline]
    pub fn get_bytes(&self, id: u32) -> Option<&[u8]> {
        self.entries.get(id as usize).map(|b| &b[..])
    }

    /// The ID the next pushed token will receive.
    #[inline]
    pub fn next_id(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(id, bytes)` in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(id, bytes)| (id as u32, &bytes[..]))
    }
}

/// Ordered set of special tokens.
///
/// Insertion order is kept (it decides the IDs handed out after training),
/// duplicates and empty strings are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecialTokens {
    tokens: Vec<CompactString>,
}

impl SpecialTokens {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token, returning false if it was empty or already present.
    pub fn insert(&mut self, token: &str) -> bool {
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(CompactString::new(token));
        true
    }

    /// Check whether `token` is in the set.
    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens.iter().map(|t| t.as_str())
    }

    /// Tokens sorted longest first; equal lengths keep insertion order.
    pub fn longest_first(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.iter().collect();
        sorted.sort_by(|a, b| b.len().cmp(&a.len()));
        sorted
    }

    /// Byte length of the longest token (0 when empty).
    pub fn max_len(&self) -> usize {
        self.tokens.iter().map(|t| t.len()).max().unwrap_or(0)
    }

    /// Number of tokens in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SpecialTokens {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut special = Self::new();
        for token in iter {
            special.insert(token.as_ref());
        }
        special
    }
}
