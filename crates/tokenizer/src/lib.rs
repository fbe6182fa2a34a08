//! bytebpe-tokenizer - Runtime byte-level BPE tokenizer
//!
//! This crate turns a trained vocabulary and merge list into a tokenizer
//! that encodes text to IDs and back.
//!
//! # Features
//!
//! - Greedy rank-ordered merging within GPT-2 pre-tokenized words
//! - Special tokens matched longest first and never split
//! - Lossless decoding of any sequence produced by `encode`
//! - Streaming encode over chunked input with identical output
//! - Parallel batch encoding with rayon
//! - JSON save and load
//!
//! # Example
//!
//! ```rust
//! use bytebpe_tokenizer::Tokenizer;
//! use bytebpe_training::{BpeTrainer, TrainingConfig};
//!
//! let config = TrainingConfig::default()
//!     .with_vocab_size(300)
//!     .with_special_tokens(["<|endoftext|>"]);
//! let model = BpeTrainer::new(config).train("the cat sat on the mat")?;
//! let tokenizer = Tokenizer::from_model(model)?;
//!
//! let ids = tokenizer.encode("the mat<|endoftext|>")?;
//! assert_eq!(tokenizer.decode(&ids), "the mat<|endoftext|>");
//!
//! let streamed = tokenizer
//!     .encode_iterable(["the m", "at<|endo", "ftext|>"])
//!     .collect::<bytebpe_tokenizer::Result<Vec<_>>>()?;
//! assert_eq!(streamed, ids);
//! # Ok::<(), bytebpe_tokenizer::TokenizerError>(())
//! ```

pub use bytebpe_core::{MergeRules, Result, SpecialTokens, TokenizerError, Vocabulary};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{EncodeIter, Tokenizer};

// IO/Serialization
pub mod io;
pub use io::{TokenizerLoader, TokenizerSaver};

// Utilities
pub mod utils;
pub use utils::EncodingCache;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
