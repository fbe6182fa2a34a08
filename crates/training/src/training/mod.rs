//! Training infrastructure for BPE tokenizers.
//!
//! This module provides the corpus counter, the pair statistics engines and
//! the merge loop that learns BPE merge rules from text data.

pub mod counter;
pub mod stats;
pub mod trainer;

pub use counter::{merge_word, CorpusCounter, FrequencyTable};
pub use stats::{count_pairs, IncrementalStats, PairStatistics, RecountStats};
pub use trainer::{BpeTrainer, StatsStrategy, TrainedModel, TrainingConfig};
