//! BPE trainer implementation.
//!
//! Learns an ordered merge list from a corpus by repeatedly merging the most
//! frequent adjacent symbol pair. The vocabulary starts with the 256 byte
//! symbols, grows by one entry per merge and ends with the special tokens.

use super::counter::{CorpusCounter, FrequencyTable};
use super::stats::{IncrementalStats, PairStatistics, RecountStats};
use bytebpe_core::{MergeRules, Result, SpecialTokens, Vocabulary, BYTE_VOCAB_SIZE};
use log::{debug, info};
use std::path::Path;

/// How pair statistics are maintained between merges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatsStrategy {
    /// Recount every pair after each merge
    Recount,
    /// Update only the words touched by each merge
    #[default]
    Incremental,
}

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Target vocabulary size, including the 256 bytes and special tokens
    pub vocab_size: usize,
    /// Special tokens appended after the merges
    pub special_tokens: SpecialTokens,
    /// Pair statistics engine
    pub strategy: StatsStrategy,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_000,
            special_tokens: SpecialTokens::new(),
            strategy: StatsStrategy::default(),
        }
    }
}

impl TrainingConfig {
    /// Set the target vocabulary size.
    pub fn with_vocab_size(mut self, vocab_size: usize) -> Self {
        self.vocab_size = vocab_size;
        self
    }

    /// Set the special tokens. Empty strings and duplicates are dropped.
    pub fn with_special_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.special_tokens = tokens.into_iter().collect();
        self
    }

    /// Set the pair statistics engine.
    pub fn with_strategy(mut self, strategy: StatsStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Upper bound on the number of merges.
    pub fn num_merges(&self) -> usize {
        self.vocab_size
            .saturating_sub(BYTE_VOCAB_SIZE)
            .saturating_sub(self.special_tokens.len())
    }
}

/// Output of training: everything the tokenizer needs.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    /// Bytes, then merge results, then special tokens
    pub vocab: Vocabulary,
    /// Merges in creation order
    pub merges: MergeRules,
    /// Special tokens, in the order their IDs were assigned
    pub special_tokens: SpecialTokens,
}

/// BPE trainer.
///
/// Trains a byte-level BPE model from text data by iteratively merging the
/// most frequent pair of symbols.
#[derive(Debug, Clone, Default)]
pub struct BpeTrainer {
    config: TrainingConfig,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Create a new BPE trainer with default configuration.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig::default().with_vocab_size(vocab_size))
    }

    /// The trainer configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// A corpus counter configured with this trainer's special tokens.
    pub fn counter(&self) -> Result<CorpusCounter> {
        CorpusCounter::new(&self.config.special_tokens)
    }

    /// Train on a single text.
    pub fn train(&self, text: &str) -> Result<TrainedModel> {
        let mut counter = self.counter()?;
        counter.add_text(text)?;
        self.train_from_table(counter.into_table())
    }

    /// Train on several documents.
    pub fn train_texts<I, S>(&self, texts: I) -> Result<TrainedModel>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counter = self.counter()?;
        for text in texts {
            counter.add_text(text.as_ref())?;
        }
        self.train_from_table(counter.into_table())
    }

    /// Train on a UTF-8 file.
    pub fn train_file<P: AsRef<Path>>(&self, path: P) -> Result<TrainedModel> {
        let mut counter = self.counter()?;
        counter.add_file(path)?;
        self.train_from_table(counter.into_table())
    }

    /// Run the merge loop over an already counted corpus.
    pub fn train_from_table(&self, table: FrequencyTable) -> Result<TrainedModel> {
        let num_merges = self.config.num_merges();
        let mut vocab = Vocabulary::with_base_bytes();

        info!(
            "Training BPE: {} distinct words, {} occurrences, up to {} merges ({:?})",
            table.len(),
            table.total_occurrences(),
            num_merges,
            self.config.strategy
        );

        let mut stats: Box<dyn PairStatistics> = match self.config.strategy {
            StatsStrategy::Recount => Box::new(RecountStats::new(table)),
            StatsStrategy::Incremental => Box::new(IncrementalStats::new(table, &vocab)),
        };

        let mut merges = MergeRules::with_capacity(num_merges);

        while merges.len() < num_merges {
            let Some(candidate) = stats.select(&vocab) else {
                info!(
                    "No pairs left after {} merges (requested {})",
                    merges.len(),
                    num_merges
                );
                break;
            };

            let (left, right) = candidate.pair;
            let new_id = vocab.push_merge(left, right)?;
            merges.push(candidate.left(), candidate.right());
            stats.apply_merge(candidate.pair, new_id, &vocab);

            debug!(
                "merge {}: {:?} + {:?} -> {} (count {})",
                merges.len() - 1,
                String::from_utf8_lossy(candidate.left()),
                String::from_utf8_lossy(candidate.right()),
                new_id,
                candidate.count
            );
        }

        for token in self.config.special_tokens.iter() {
            vocab.push_special(token);
        }

        info!(
            "Training complete: {} merges, vocabulary size {}",
            merges.len(),
            vocab.len()
        );

        Ok(TrainedModel {
            vocab,
            merges,
            special_tokens: self.config.special_tokens.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "low low low low low lower lower widest widest widest \
                          newest newest newest newest newest newest";

    fn train(vocab_size: usize, special: &[&str], strategy: StatsStrategy) -> TrainedModel {
        let config = TrainingConfig::default()
            .with_vocab_size(vocab_size)
            .with_special_tokens(special)
            .with_strategy(strategy);
        BpeTrainer::new(config).train(CORPUS).unwrap()
    }

    fn rules(model: &TrainedModel) -> Vec<(String, String)> {
        model
            .merges
            .iter()
            .map(|(a, b)| {
                (
                    String::from_utf8_lossy(a).into_owned(),
                    String::from_utf8_lossy(b).into_owned(),
                )
            })
            .collect()
    }

    #[test]
    fn test_first_merges() {
        for strategy in [StatsStrategy::Recount, StatsStrategy::Incremental] {
            let model = train(259, &[], strategy);

            assert_eq!(
                rules(&model)[..2],
                [
                    ("s".to_string(), "t".to_string()),
                    ("e".to_string(), "st".to_string())
                ]
            );
            assert_eq!(model.vocab.len(), 259);
            assert_eq!(model.vocab.get_bytes(256), Some(&b"st"[..]));
            assert_eq!(model.vocab.get_bytes(257), Some(&b"est"[..]));
        }
    }

    #[test]
    fn test_special_token_after_merges() {
        let model = train(260, &["<|endoftext|>"], StatsStrategy::Incremental);

        assert_eq!(model.merges.len(), 3);
        assert_eq!(model.vocab.len(), 260);
        assert_eq!(model.vocab.get_bytes(259), Some(&b"<|endoftext|>"[..]));
        assert_eq!(model.vocab.get_id(b"<|endoftext|>"), Some(259));
    }

    #[test]
    fn test_merge_concatenates_to_vocab_entry() {
        let model = train(280, &[], StatsStrategy::Incremental);

        for (i, (a, b)) in model.merges.iter().enumerate() {
            let joined = [a, b].concat();
            assert_eq!(model.vocab.get_bytes((256 + i) as u32), Some(joined.as_slice()));
        }
    }

    #[test]
    fn test_early_stop_when_pairs_exhausted() {
        let model = BpeTrainer::with_vocab_size(1000).train("ab ab").unwrap();

        // "ab" and " ab": (a, b) then (" ", "ab")
        assert_eq!(model.merges.len(), 2);
        assert_eq!(model.vocab.len(), 258);
    }

    #[test]
    fn test_vocab_too_small() {
        let config = TrainingConfig::default()
            .with_vocab_size(100)
            .with_special_tokens(["<s>"]);
        let model = BpeTrainer::new(config).train(CORPUS).unwrap();

        assert!(model.merges.is_empty());
        assert_eq!(model.vocab.len(), 257);
        assert_eq!(model.vocab.get_id(b"<s>"), Some(256));
    }

    #[test]
    fn test_empty_corpus() {
        let model = BpeTrainer::with_vocab_size(300).train("").unwrap();

        assert!(model.merges.is_empty());
        assert_eq!(model.vocab.len(), 256);
    }

    #[test]
    fn test_special_tokens_do_not_merge() {
        let text = "<|endoftext|><|endoftext|><|endoftext|>ab";
        let config = TrainingConfig::default()
            .with_vocab_size(300)
            .with_special_tokens(["<|endoftext|>"]);
        let model = BpeTrainer::new(config).train(text).unwrap();

        assert_eq!(rules(&model), vec![("a".to_string(), "b".to_string())]);
    }

    #[test]
    fn test_duplicate_special_tokens_counted_once() {
        let config = TrainingConfig::default()
            .with_vocab_size(258)
            .with_special_tokens(["<s>", "<s>", ""]);

        assert_eq!(config.special_tokens.len(), 1);
        assert_eq!(config.num_merges(), 1);
    }

    #[test]
    fn test_train_file_missing() {
        let result = BpeTrainer::default().train_file("/nonexistent/corpus.txt");
        assert!(matches!(result, Err(bytebpe_core::TokenizerError::Io { .. })));
    }
}
