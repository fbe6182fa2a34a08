//! Priority queue for BPE merge candidates.
//!
//! Training picks the pair with the highest count; ties go to the pair whose
//! first token's bytes are lexicographically greater, then the second token's
//! bytes. Token contents never change once created, so a candidate can carry
//! a snapshot of them and be ordered without access to the vocabulary.

use crate::core::merges::Pair;
use crate::core::vocab::Vocabulary;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

/// Borrowed ordering key shared by every merge selection strategy.
///
/// Fields compare in declaration order. The ID pair is last and only decides
/// between distinct pairs whose contents are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CandidateKey<'a> {
    pub count: u64,
    pub left: &'a [u8],
    pub right: &'a [u8],
    pub pair: Pair,
}

impl<'a> CandidateKey<'a> {
    /// Build the key for `pair` from the current vocabulary.
    #[inline]
    pub fn new(pair: Pair, count: u64, vocab: &'a Vocabulary) -> Self {
        Self {
            count,
            left: vocab.get_bytes(pair.0).unwrap_or_default(),
            right: vocab.get_bytes(pair.1).unwrap_or_default(),
            pair,
        }
    }
}

/// A merge candidate during BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of token IDs to merge
    pub pair: Pair,
    /// The frequency/count of this pair
    pub count: u64,
    left: Box<[u8]>,
    right: Box<[u8]>,
}

impl MergeCandidate {
    /// Create a new merge candidate, snapshotting the token contents.
    pub fn new(pair: Pair, count: u64, vocab: &Vocabulary) -> Self {
        let key = CandidateKey::new(pair, count, vocab);
        Self {
            pair,
            count,
            left: key.left.into(),
            right: key.right.into(),
        }
    }

    /// Bytes of the first token.
    pub fn left(&self) -> &[u8] {
        &self.left
    }

    /// Bytes of the second token.
    pub fn right(&self) -> &[u8] {
        &self.right
    }

    /// The ordering key of this candidate.
    #[inline]
    pub fn key(&self) -> CandidateKey<'_> {
        CandidateKey {
            count: self.count,
            left: &self.left,
            right: &self.right,
            pair: self.pair,
        }
    }
}

// Higher count first, then lexicographically greater contents
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge operations.
///
/// Uses an 8-ary heap for better cache locality than a binary heap. Updates
/// push a fresh entry instead of re-keying, so the heap holds stale entries
/// that are skipped on pop by comparing against the current count.
pub struct PairPriorityQueue {
    /// The heap storing merge candidates
    heap: OctonaryHeap<MergeCandidate>,
    /// Track current counts to detect stale entries
    current_counts: AHashMap<Pair, u64>,
}

impl PairPriorityQueue {
    /// Create a new priority queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            current_counts: AHashMap::with_capacity(capacity),
        }
    }

    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
            current_counts: AHashMap::new(),
        }
    }

    /// Push a merge candidate onto the queue.
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.current_counts.insert(candidate.pair, candidate.count);
        self.heap.push(candidate);
    }

    /// Pop the highest priority merge candidate.
    ///
    /// Returns None if the queue is empty or only contains stale entries.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.current_counts.get(&candidate.pair) == Some(&candidate.count) {
                self.current_counts.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Set the count for a pair, marking older entries stale.
    ///
    /// A count of zero removes the pair.
    pub fn update(&mut self, pair: Pair, count: u64, vocab: &Vocabulary) {
        if count == 0 {
            self.current_counts.remove(&pair);
        } else if self.current_counts.get(&pair) != Some(&count) {
            self.push(MergeCandidate::new(pair, count, vocab));
        }
    }

    /// Check if no live pair remains.
    pub fn is_empty(&self) -> bool {
        self.current_counts.is_empty()
    }
}

impl Default for PairPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(b: u8) -> u32 {
        b as u32
    }

    #[test]
    fn test_push_pop() {
        let vocab = Vocabulary::with_base_bytes();
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 10, &vocab));
        queue.push(MergeCandidate::new((1, 2), 20, &vocab));
        queue.push(MergeCandidate::new((2, 3), 15, &vocab));

        assert_eq!(queue.pop().unwrap().pair, (1, 2));
        assert_eq!(queue.pop().unwrap().pair, (2, 3));
        assert_eq!(queue.pop().unwrap().pair, (0, 1));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_tie_break_on_first_content() {
        let vocab = Vocabulary::with_base_bytes();
        let mut queue = PairPriorityQueue::new();

        // (e, s) and (s, t) tie; 's' > 'e' so (s, t) wins
        queue.push(MergeCandidate::new((id(b'e'), id(b's')), 9, &vocab));
        queue.push(MergeCandidate::new((id(b's'), id(b't')), 9, &vocab));

        assert_eq!(queue.pop().unwrap().pair, (id(b's'), id(b't')));
    }

    #[test]
    fn test_tie_break_compares_content_not_ids() {
        let mut vocab = Vocabulary::with_base_bytes();
        // ID 256 holds "zz" which sorts above every single byte except 'z' itself
        let zz = vocab.push(b"zz");

        let low_id = MergeCandidate::new((id(b'a'), id(b'b')), 5, &vocab);
        let high_id = MergeCandidate::new((id(b'a'), zz), 5, &vocab);
        let by_content = MergeCandidate::new((id(b'a'), id(b'z')), 5, &vocab);

        assert!(high_id > low_id);
        assert!(high_id > by_content);
        assert!(by_content > low_id);
    }

    #[test]
    fn test_stale_entry_detection() {
        let vocab = Vocabulary::with_base_bytes();
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 10, &vocab));
        queue.push(MergeCandidate::new((1, 2), 20, &vocab));

        // Update count for (0, 1), making first entry stale
        queue.update((0, 1), 15, &vocab);

        let first = queue.pop().unwrap();
        assert_eq!(first.pair, (1, 2));

        let second = queue.pop().unwrap();
        assert_eq!(second.pair, (0, 1));
        assert_eq!(second.count, 15);

        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_update_to_zero_removes() {
        let vocab = Vocabulary::with_base_bytes();
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 10, &vocab));
        queue.update((0, 1), 0, &vocab);

        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }
}
