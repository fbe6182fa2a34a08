//! Utility modules for the BPE tokenizer.

pub mod cache;

pub use cache::{CacheStats, EncodingCache, DEFAULT_CACHE_CAPACITY};
