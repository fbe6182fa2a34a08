//! Core BPE data structures.
//!
//! The vocabulary arena, the ordered merge list and the priority queue used
//! to pick merges during training.

pub mod merges;
pub mod priority;
pub mod vocab;

pub use merges::{MergeMap, MergeRule, MergeRules, Pair};
pub use priority::{CandidateKey, MergeCandidate, PairPriorityQueue};
pub use vocab::{SpecialTokens, Vocab, VocabR, Vocabulary, BYTE_VOCAB_SIZE};
