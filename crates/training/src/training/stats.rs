//! Pair statistics engines.
//!
//! A [`PairStatistics`] implementation knows how often every adjacent symbol
//! pair occurs across the word table, hands out the best merge candidate and
//! keeps its numbers current as merges are applied. Both engines order
//! candidates with [`CandidateKey`], so they select the same merges.

use super::counter::{merge_word, FrequencyTable};
use ahash::{AHashMap, AHashSet};
use bytebpe_core::{CandidateKey, MergeCandidate, Pair, PairPriorityQueue, Vocabulary};

/// Count every adjacent pair, weighted by word frequency.
///
/// A pair occurring twice in a word of frequency `f` contributes `2f`.
pub fn count_pairs(table: &FrequencyTable) -> AHashMap<Pair, u64> {
    let mut pair_counts: AHashMap<Pair, u64> = AHashMap::new();

    for (word, count) in table.iter() {
        for window in word.windows(2) {
            *pair_counts.entry((window[0], window[1])).or_insert(0) += count;
        }
    }

    pair_counts
}

/// Source of merge candidates during training.
pub trait PairStatistics {
    /// Take the best pair. `None` once no pair is left.
    fn select(&mut self, vocab: &Vocabulary) -> Option<MergeCandidate>;

    /// Rewrite the words after `pair` was merged into `new_id`.
    ///
    /// `vocab` must already contain `new_id`.
    fn apply_merge(&mut self, pair: Pair, new_id: u32, vocab: &Vocabulary);

    /// Check if no adjacent pair remains.
    fn is_exhausted(&self) -> bool;
}

/// Recounts every pair from scratch on each step.
///
/// Quadratic in the number of merges, but with no index to keep in sync.
#[derive(Debug, Clone)]
pub struct RecountStats {
    table: FrequencyTable,
}

impl RecountStats {
    /// Wrap a frequency table.
    pub fn new(table: FrequencyTable) -> Self {
        Self { table }
    }

    /// The current word table.
    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }
}

impl PairStatistics for RecountStats {
    fn select(&mut self, vocab: &Vocabulary) -> Option<MergeCandidate> {
        count_pairs(&self.table)
            .into_iter()
            .max_by(|&(a, a_count), &(b, b_count)| {
                CandidateKey::new(a, a_count, vocab).cmp(&CandidateKey::new(b, b_count, vocab))
            })
            .map(|(pair, count)| MergeCandidate::new(pair, count, vocab))
    }

    fn apply_merge(&mut self, pair: Pair, new_id: u32, _vocab: &Vocabulary) {
        self.table = self.table.merge_pair(pair, new_id);
    }

    fn is_exhausted(&self) -> bool {
        self.table.iter().all(|(word, _)| word.len() < 2)
    }
}

/// Keeps pair counts and a word index up to date across merges.
///
/// Only the words that contained the merged pair are revisited, and the best
/// pair comes from a lazily invalidated [`PairPriorityQueue`].
pub struct IncrementalStats {
    /// Distinct words as symbol IDs
    words: Vec<Vec<u32>>,
    /// Occurrence count per word
    counts: Vec<u64>,
    /// Pair -> weighted occurrence count
    pair_counts: AHashMap<Pair, u64>,
    /// Pair -> indices of words that may contain it
    where_to_update: AHashMap<Pair, AHashSet<usize>>,
    /// Candidates ordered by count then content
    queue: PairPriorityQueue,
}

impl IncrementalStats {
    /// Index `table` and seed the queue with every pair.
    pub fn new(table: FrequencyTable, vocab: &Vocabulary) -> Self {
        let (words, counts) = table.into_parts();
        let mut pair_counts: AHashMap<Pair, u64> = AHashMap::new();
        let mut where_to_update: AHashMap<Pair, AHashSet<usize>> = AHashMap::new();

        for (idx, (word, &count)) in words.iter().zip(counts.iter()).enumerate() {
            for window in word.windows(2) {
                let pair = (window[0], window[1]);
                *pair_counts.entry(pair).or_insert(0) += count;
                where_to_update.entry(pair).or_default().insert(idx);
            }
        }

        let mut queue = PairPriorityQueue::with_capacity(pair_counts.len());
        for (&pair, &count) in &pair_counts {
            queue.push(MergeCandidate::new(pair, count, vocab));
        }

        Self {
            words,
            counts,
            pair_counts,
            where_to_update,
            queue,
        }
    }

    /// Current weighted count of `pair`.
    pub fn pair_count(&self, pair: Pair) -> u64 {
        self.pair_counts.get(&pair).copied().unwrap_or(0)
    }
}

impl PairStatistics for IncrementalStats {
    fn select(&mut self, _vocab: &Vocabulary) -> Option<MergeCandidate> {
        self.queue.pop()
    }

    fn apply_merge(&mut self, pair: Pair, new_id: u32, vocab: &Vocabulary) {
        let Some(indices) = self.where_to_update.remove(&pair) else {
            return;
        };

        let mut touched: AHashSet<Pair> = AHashSet::new();

        for idx in indices {
            let word = &self.words[idx];
            let present = word.windows(2).any(|w| (w[0], w[1]) == pair);
            // Index entries can outlive the pair in a word
            if !present {
                continue;
            }

            let count = self.counts[idx];
            for window in word.windows(2) {
                let old = (window[0], window[1]);
                if let Some(c) = self.pair_counts.get_mut(&old) {
                    *c = c.saturating_sub(count);
                }
                touched.insert(old);
            }

            let merged = merge_word(word, pair, new_id);
            for window in merged.windows(2) {
                let new = (window[0], window[1]);
                *self.pair_counts.entry(new).or_insert(0) += count;
                self.where_to_update.entry(new).or_default().insert(idx);
                touched.insert(new);
            }

            self.words[idx] = merged;
        }

        for p in touched {
            let count = self.pair_count(p);
            if count == 0 {
                self.pair_counts.remove(&p);
            }
            self.queue.update(p, count, vocab);
        }
    }

    fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Vec<u32> {
        s.bytes().map(u32::from).collect()
    }

    fn table(words: &[(&str, u64)]) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for &(word, count) in words {
            table.add(sym(word), count);
        }
        table
    }

    fn id(b: u8) -> u32 {
        b as u32
    }

    #[test]
    fn test_count_pairs_weighted() {
        let counts = count_pairs(&table(&[("abab", 3), ("b", 10)]));

        assert_eq!(counts.get(&(id(b'a'), id(b'b'))), Some(&6));
        assert_eq!(counts.get(&(id(b'b'), id(b'a'))), Some(&3));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_recount_select_tie_break() {
        let vocab = Vocabulary::with_base_bytes();
        // (a, b) and (c, d) both occur 5 times; 'c' > 'a'
        let mut stats = RecountStats::new(table(&[("ab", 5), ("cd", 5)]));

        let best = stats.select(&vocab).unwrap();
        assert_eq!(best.pair, (id(b'c'), id(b'd')));
        assert_eq!(best.count, 5);
    }

    #[test]
    fn test_incremental_select_tie_break() {
        let vocab = Vocabulary::with_base_bytes();
        let mut stats = IncrementalStats::new(table(&[("ab", 5), ("cd", 5)]), &vocab);

        let best = stats.select(&vocab).unwrap();
        assert_eq!(best.pair, (id(b'c'), id(b'd')));
    }

    #[test]
    fn test_incremental_apply_merge_updates_counts() {
        let mut vocab = Vocabulary::with_base_bytes();
        let mut stats = IncrementalStats::new(table(&[("abc", 2), ("bc", 1)]), &vocab);

        let pair = (id(b'b'), id(b'c'));
        assert_eq!(stats.pair_count(pair), 3);

        let best = stats.select(&vocab).unwrap();
        assert_eq!(best.pair, pair);

        let bc = vocab.push_merge(pair.0, pair.1).unwrap();
        stats.apply_merge(pair, bc, &vocab);

        assert_eq!(stats.pair_count(pair), 0);
        assert_eq!(stats.pair_count((id(b'a'), id(b'b'))), 0);
        assert_eq!(stats.pair_count((id(b'a'), bc)), 2);

        let next = stats.select(&vocab).unwrap();
        assert_eq!(next.pair, (id(b'a'), bc));
        assert_eq!(next.count, 2);
        assert!(stats.select(&vocab).is_none());
    }

    #[test]
    fn test_exhaustion() {
        let mut vocab = Vocabulary::with_base_bytes();
        let words = table(&[("ab", 1)]);
        let mut recount = RecountStats::new(words.clone());
        let mut incremental = IncrementalStats::new(words, &vocab);

        assert!(!recount.is_exhausted());
        assert!(!incremental.is_exhausted());

        let pair = (id(b'a'), id(b'b'));
        let ab = vocab.push_merge(pair.0, pair.1).unwrap();
        recount.select(&vocab);
        incremental.select(&vocab);
        recount.apply_merge(pair, ab, &vocab);
        incremental.apply_merge(pair, ab, &vocab);

        assert!(recount.is_exhausted());
        assert!(incremental.is_exhausted());
        assert!(recount.select(&vocab).is_none());
        assert!(incremental.select(&vocab).is_none());
    }
}
