//! Word frequency counting for BPE training.
//!
//! The corpus is pre-tokenized once; every distinct word is stored as a
//! sequence of symbol IDs (initially one per byte) together with the number
//! of times it occurred. Special tokens never reach the table.

use ahash::AHashMap;
use bytebpe_core::pre_tokenizer::{PreTokenizer, Pretoken};
use bytebpe_core::{Pair, Result, SpecialTokens, TokenizerError};
use std::fs;
use std::path::Path;

/// Distinct word (as symbol IDs) -> occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    words: AHashMap<Vec<u32>, u64>,
}

impl FrequencyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: AHashMap::with_capacity(capacity),
        }
    }

    /// Add `count` occurrences of `word`.
    pub fn add(&mut self, word: Vec<u32>, count: u64) {
        *self.words.entry(word).or_insert(0) += count;
    }

    /// Occurrence count of `word`.
    pub fn get(&self, word: &[u32]) -> Option<u64> {
        self.words.get(word).copied()
    }

    /// Number of distinct words.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the table holds no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over `(word, count)` in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u32], u64)> + '_ {
        self.words.iter().map(|(word, &count)| (word.as_slice(), count))
    }

    /// Sum of all word counts.
    pub fn total_occurrences(&self) -> u64 {
        self.words.values().sum()
    }

    /// Rewrite every word, replacing `pair` with `new_id`.
    ///
    /// Words that do not contain the first symbol of the pair are copied
    /// through unchanged. Words that become equal after the rewrite have
    /// their counts summed.
    pub fn merge_pair(&self, pair: Pair, new_id: u32) -> FrequencyTable {
        let mut merged = FrequencyTable::with_capacity(self.words.len());

        for (word, &count) in &self.words {
            if word.contains(&pair.0) {
                merged.add(merge_word(word, pair, new_id), count);
            } else {
                merged.add(word.clone(), count);
            }
        }

        merged
    }

    /// Consume the table into parallel word and count vectors.
    pub fn into_parts(self) -> (Vec<Vec<u32>>, Vec<u64>) {
        self.words.into_iter().unzip()
    }
}

/// Replace non-overlapping occurrences of `pair` in `word`, left to right.
///
/// Scanning resumes after each newly created symbol, so `A A A` merged on
/// `(A, A)` becomes `N A`.
pub fn merge_word(word: &[u32], pair: Pair, new_id: u32) -> Vec<u32> {
    let mut out = Vec::with_capacity(word.len());
    let mut i = 0;

    while i < word.len() {
        if i + 1 < word.len() && word[i] == pair.0 && word[i + 1] == pair.1 {
            out.push(new_id);
            i += 2;
        } else {
            out.push(word[i]);
            i += 1;
        }
    }

    out
}

/// Builds a [`FrequencyTable`] from raw text.
#[derive(Debug, Clone)]
pub struct CorpusCounter {
    pre_tokenizer: PreTokenizer,
    table: FrequencyTable,
}

impl CorpusCounter {
    /// Create a counter that isolates `special` before splitting words.
    pub fn new(special: &SpecialTokens) -> Result<Self> {
        Ok(Self {
            pre_tokenizer: PreTokenizer::new(special)?,
            table: FrequencyTable::new(),
        })
    }

    /// Count the words of one document.
    ///
    /// Can be called repeatedly; counts accumulate.
    pub fn add_text(&mut self, text: &str) -> Result<()> {
        for pretoken in self.pre_tokenizer.pretokens(text) {
            if let Pretoken::Word(word) = pretoken? {
                let symbols: Vec<u32> = word.bytes().map(u32::from).collect();
                self.table.add(symbols, 1);
            }
        }
        Ok(())
    }

    /// Read a UTF-8 file and count its words.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| TokenizerError::Io {
            path: path.to_path_buf(),
            err,
        })?;
        self.add_text(&text)
    }

    /// The table built so far.
    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    /// Consume the counter, returning its table.
    pub fn into_table(self) -> FrequencyTable {
        self.table
    }
}
