//! Merge rule management for BPE.
//!
//! Training records merges as ordered pairs of byte strings; the position of a
//! rule is its priority. At encode time the list is compiled once into a
//! `MergeMap` keyed by token IDs for constant-time lookups.

use crate::core::vocab::Vocabulary;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A pair of token IDs that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, new_token_id).
///
/// The rank indicates the priority of this merge rule (lower rank = higher priority).
/// The new_token_id is the ID of the token created by merging this pair.
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// A single merge rule: the two byte strings joined at creation time.
pub type MergeRule = (Vec<u8>, Vec<u8>);

/// Ordered list of BPE merge rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergeRules {
    rules: Vec<MergeRule>,
}

impl MergeRules {
    /// Create a new empty list of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new list with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rules: Vec::with_capacity(capacity),
        }
    }

    /// Append a merge rule with the next (lowest) priority.
    pub fn push(&mut self, left: &[u8], right: &[u8]) {
        self.rules.push((left.to_vec(), right.to_vec()));
    }

    /// Get the rule at `rank`.
    #[inline]
    pub fn get(&self, rank: usize) -> Option<(&[u8], &[u8])> {
        self.rules
            .get(rank)
            .map(|(a, b)| (a.as_slice(), b.as_slice()))
    }

    /// Iterate over rules in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        self.rules.iter().map(|(a, b)| (a.as_slice(), b.as_slice()))
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Compile the rules into an ID-keyed lookup against `vocab`.
    ///
    /// Every part and every merged result must exist in the vocabulary. When
    /// the same pair appears more than once, the earliest rank is kept.
    pub fn build_merge_map(&self, vocab: &Vocabulary) -> Result<MergeMap> {
        let mut map = MergeMap::with_capacity(self.rules.len());

        for (rank, (left, right)) in self.rules.iter().enumerate() {
            let lookup = |bytes: &[u8]| {
                vocab.get_id(bytes).ok_or_else(|| {
                    TokenizerError::InvalidMerge(format!(
                        "rule {} ({:?}, {:?}) refers to {:?}, which is not in the vocabulary",
                        rank,
                        String::from_utf8_lossy(left),
                        String::from_utf8_lossy(right),
                        String::from_utf8_lossy(bytes)
                    ))
                })
            };

            let pair = (lookup(left.as_slice())?, lookup(right.as_slice())?);
            let joined = [left.as_slice(), right.as_slice()].concat();
            let merged = lookup(joined.as_slice())?;

            map.entry(pair).or_insert((rank as u32, merged));
        }

        Ok(map)
    }
}

impl FromIterator<MergeRule> for MergeRules {
    fn from_iter<I: IntoIterator<Item = MergeRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
