//! Encoding cache for repeated words.
//!
//! Natural text repeats a small set of words constantly, so the streaming
//! encoder keeps the IDs of recently seen words instead of re-running the
//! merge loop for each occurrence.

use crate::Result;
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Default number of cached words.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

#[derive(Debug, Clone)]
struct Entry {
    ids: Vec<u32>,
    /// Value of `clock` at the last use
    stamp: u64,
}

/// LRU cache from word text to token IDs.
///
/// Every entry carries the stamp of its last use and `by_stamp` indexes keys
/// by that stamp, so a hit re-stamps in O(log n) and eviction takes the
/// smallest stamp.
#[derive(Debug, Clone)]
pub struct EncodingCache {
    /// Word -> encoded tokens
    cache: AHashMap<String, Entry>,
    /// Last-use stamp -> word, oldest first
    by_stamp: BTreeMap<u64, String>,
    clock: u64,
    /// Maximum number of entries
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl EncodingCache {
    /// Create a new encoding cache holding at most `capacity` words.
    ///
    /// A capacity of zero disables caching.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: AHashMap::with_capacity(capacity),
            by_stamp: BTreeMap::new(),
            clock: 0,
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Create a new encoding cache with [`DEFAULT_CACHE_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Append the IDs for `word` to `out`, encoding it on a miss.
    pub fn encode_into<F>(&mut self, word: &str, out: &mut Vec<u32>, encoder: F) -> Result<()>
    where
        F: FnOnce(&str) -> Result<Vec<u32>>,
    {
        self.clock += 1;
        let stamp = self.clock;

        if let Some(entry) = self.cache.get_mut(word) {
            out.extend_from_slice(&entry.ids);
            self.hits += 1;
            if let Some(key) = self.by_stamp.remove(&entry.stamp) {
                self.by_stamp.insert(stamp, key);
            }
            entry.stamp = stamp;
            return Ok(());
        }

        self.misses += 1;
        let ids = encoder(word)?;
        out.extend_from_slice(&ids);
        self.insert(word.to_string(), ids, stamp);
        Ok(())
    }

    /// Cached IDs for `word`, without updating recency.
    pub fn peek(&self, word: &str) -> Option<&[u32]> {
        self.cache.get(word).map(|entry| entry.ids.as_slice())
    }

    fn insert(&mut self, key: String, ids: Vec<u32>, stamp: u64) {
        if self.capacity == 0 {
            return;
        }

        while self.cache.len() >= self.capacity {
            match self.by_stamp.pop_first() {
                Some((_, oldest)) => {
                    self.cache.remove(&oldest);
                }
                None => break,
            }
        }

        self.by_stamp.insert(stamp, key.clone());
        self.cache.insert(key, Entry { ids, stamp });
    }

    /// Clear all entries and statistics.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.by_stamp.clear();
        self.clock = 0;
        self.hits = 0;
        self.misses = 0;
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get the cache capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            entries: self.cache.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            hit_rate: (lookups > 0).then(|| self.hits as f64 / lookups as f64),
        }
    }
}

impl Default for EncodingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    /// Number of entries in the cache
    pub entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that ran the encoder
    pub misses: u64,
    /// Hit rate, if any lookup happened
    pub hit_rate: Option<f64>,
}
