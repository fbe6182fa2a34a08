//! bytebpe-core - byte-level BPE building blocks
//!
//! This crate holds what training and encoding share: the vocabulary arena,
//! merge rules, the merge candidate ordering and the pre-tokenizer.
//!
//! # Example
//!
//! ```rust
//! use bytebpe_core::Vocabulary;
//!
//! let mut vocab = Vocabulary::with_base_bytes();
//! let st = vocab.push_merge(b's' as u32, b't' as u32).unwrap();
//! assert_eq!(vocab.get_bytes(st), Some(&b"st"[..]));
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

pub mod core;
pub use core::{
    CandidateKey, MergeCandidate, MergeMap, MergeRule, MergeRules, Pair, PairPriorityQueue,
    SpecialTokens, Vocab, VocabR, Vocabulary, BYTE_VOCAB_SIZE,
};

pub mod pre_tokenizer;
pub use pre_tokenizer::{PreTokenizer, Pretoken, Segment, SpecialTokenSplitter, WordSplitter};
