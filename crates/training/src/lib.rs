//! bytebpe-training - BPE merge-rule training
//!
//! This crate learns a byte-level vocabulary and an ordered merge list from
//! text data.
//!
//! # Features
//!
//! - Pre-tokenization with the GPT-2 word pattern; special tokens are
//!   isolated and never take part in merges
//! - Two pair statistics engines with identical results: a full recount per
//!   merge and an incremental index with an 8-ary heap
//! - Deterministic tie-breaking on token contents
//!
//! # Example
//!
//! ```rust
//! use bytebpe_training::{BpeTrainer, TrainingConfig};
//!
//! let config = TrainingConfig::default()
//!     .with_vocab_size(300)
//!     .with_special_tokens(["<|endoftext|>"]);
//!
//! let model = BpeTrainer::new(config).train("low lower lowest").unwrap();
//! assert_eq!(model.vocab.get_id(b"<|endoftext|>"), Some(model.vocab.len() as u32 - 1));
//! ```

pub use bytebpe_core::{Result, TokenizerError};

pub mod training;
pub use training::{
    count_pairs, merge_word, BpeTrainer, CorpusCounter, FrequencyTable, IncrementalStats,
    PairStatistics, RecountStats, StatsStrategy, TrainedModel, TrainingConfig,
};
