//! Main tokenizer implementation.
//!
//! The `Tokenizer` is built once from a vocabulary, an ordered merge list and
//! a set of special tokens, and is read-only afterwards. It can be shared
//! freely across threads.

pub mod stream;

pub use stream::EncodeIter;

use crate::io::{LoadedModel, TokenizerLoader, TokenizerSaver};
use crate::utils::EncodingCache;
use bytebpe_core::pre_tokenizer::{PreTokenizer, Pretoken};
use bytebpe_core::{
    MergeMap, MergeRules, Result, SpecialTokens, TokenizerError, Vocabulary, BYTE_VOCAB_SIZE,
};
use bytebpe_training::TrainedModel;
use log::{debug, warn};
use std::path::Path;

/// Byte-level BPE tokenizer.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// ID <-> bytes
    vocab: Vocabulary,
    /// Merge rules in priority order, kept for saving
    merges: MergeRules,
    /// (left, right) -> (rank, merged)
    merge_map: MergeMap,
    /// ID of each single byte
    byte_ids: [Option<u32>; BYTE_VOCAB_SIZE],
    /// Special tokens that have a vocabulary entry
    special_tokens: SpecialTokens,
    /// Special token isolation and word splitting
    pre_tokenizer: PreTokenizer,
}

impl Tokenizer {
    /// Create a tokenizer from its parts.
    ///
    /// Every merge rule must be backed by the vocabulary. Special tokens whose
    /// bytes are not in the vocabulary are dropped and then treated as text.
    pub fn new(
        vocab: Vocabulary,
        merges: MergeRules,
        special_tokens: SpecialTokens,
    ) -> Result<Self> {
        let merge_map = merges.build_merge_map(&vocab)?;

        let mut registered = SpecialTokens::new();
        for token in special_tokens.iter() {
            if vocab.get_id(token.as_bytes()).is_some() {
                registered.insert(token);
            } else {
                warn!(
                    "Special token {:?} is not in the vocabulary and will be encoded as text",
                    token
                );
            }
        }

        let mut byte_ids = [None; BYTE_VOCAB_SIZE];
        for (byte, slot) in byte_ids.iter_mut().enumerate() {
            *slot = vocab.get_id(&[byte as u8]);
        }

        let pre_tokenizer = PreTokenizer::new(&registered)?;

        debug!(
            "Tokenizer ready: {} tokens, {} merges, {} special tokens",
            vocab.len(),
            merge_map.len(),
            registered.len()
        );

        Ok(Self {
            vocab,
            merges,
            merge_map,
            byte_ids,
            special_tokens: registered,
            pre_tokenizer,
        })
    }

    /// Create a tokenizer from a training result.
    pub fn from_model(model: TrainedModel) -> Result<Self> {
        Self::new(model.vocab, model.merges, model.special_tokens)
    }

    /// Encode text to token IDs.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let mut ids = Vec::with_capacity(text.len() / 3);
        self.encode_into(text, &mut ids, None)?;
        Ok(ids)
    }

    /// Encode a batch of independent texts in parallel.
    pub fn encode_batch<S>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>>
    where
        S: AsRef<str> + Sync,
    {
        use rayon::prelude::*;

        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref()))
            .collect()
    }

    /// Lazily encode a sequence of text chunks.
    ///
    /// The IDs produced are exactly those of encoding the concatenated
    /// chunks in one call, however the text is cut.
    pub fn encode_iterable<I>(&self, chunks: I) -> EncodeIter<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        EncodeIter::new(self, chunks.into_iter())
    }

    /// Encode `text`, appending to `out`. Words go through `cache` if given.
    pub(crate) fn encode_into(
        &self,
        text: &str,
        out: &mut Vec<u32>,
        mut cache: Option<&mut EncodingCache>,
    ) -> Result<()> {
        for pretoken in self.pre_tokenizer.pretokens(text) {
            match pretoken? {
                Pretoken::Special(token) => out.push(self.special_id(token)?),
                Pretoken::Word(word) => match cache.as_deref_mut() {
                    Some(cache) => cache.encode_into(word, out, |w| self.encode_word(w))?,
                    None => self.merge_word_into(word, out)?,
                },
            }
        }
        Ok(())
    }

    /// Encode a single pre-tokenized word with the merge rules.
    pub fn encode_word(&self, word: &str) -> Result<Vec<u32>> {
        let mut ids = Vec::with_capacity(word.len());
        self.merge_word_into(word, &mut ids)?;
        Ok(ids)
    }

    /// Start from one symbol per byte and apply the lowest-ranked merge,
    /// leftmost first, until no adjacent pair has a rule.
    fn merge_word_into(&self, word: &str, out: &mut Vec<u32>) -> Result<()> {
        let mut symbols = word
            .bytes()
            .map(|b| {
                self.byte_ids[b as usize].ok_or_else(|| TokenizerError::UnknownToken(vec![b]))
            })
            .collect::<Result<Vec<u32>>>()?;

        while symbols.len() > 1 {
            let mut best: Option<(u32, usize, u32)> = None;

            for (i, window) in symbols.windows(2).enumerate() {
                if let Some(&(rank, merged)) = self.merge_map.get(&(window[0], window[1])) {
                    if best.map_or(true, |(best_rank, _, _)| rank < best_rank) {
                        best = Some((rank, i, merged));
                    }
                }
            }

            let Some((_, i, merged)) = best else {
                break;
            };
            symbols[i] = merged;
            symbols.remove(i + 1);
        }

        out.extend_from_slice(&symbols);
        Ok(())
    }

    /// ID of a special token.
    pub fn special_token_id(&self, token: &str) -> Option<u32> {
        if self.special_tokens.contains(token) {
            self.vocab.get_id(token.as_bytes())
        } else {
            None
        }
    }

    fn special_id(&self, token: &str) -> Result<u32> {
        self.special_token_id(token)
            .ok_or_else(|| TokenizerError::UnknownSpecialToken(token.to_string()))
    }

    /// Decode token IDs back to text.
    ///
    /// Unknown IDs are skipped and invalid UTF-8 is replaced with U+FFFD.
    pub fn decode(&self, ids: &[u32]) -> String {
        String::from_utf8_lossy(&self.decode_bytes(ids)).into_owned()
    }

    /// Concatenate the bytes of every known ID.
    pub fn decode_bytes(&self, ids: &[u32]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ids.len() * 4);
        for &id in ids {
            if let Some(token) = self.vocab.get_bytes(id) {
                bytes.extend_from_slice(token);
            }
        }
        bytes
    }

    /// Bytes of a single token.
    pub fn id_to_token(&self, id: u32) -> Option<&[u8]> {
        self.vocab.get_bytes(id)
    }

    /// ID of a byte string, if it is a token.
    pub fn token_to_id(&self, token: &[u8]) -> Option<u32> {
        self.vocab.get_id(token)
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Get the merge rules.
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Special tokens recognised during encoding.
    pub fn special_tokens(&self) -> &SpecialTokens {
        &self.special_tokens
    }

    pub(crate) fn pre_tokenizer(&self) -> &PreTokenizer {
        &self.pre_tokenizer
    }

    /// Save the tokenizer to a directory.
    pub fn save(&self, dir: &Path) -> Result<()> {
        TokenizerSaver::new(&self.vocab, &self.merges, &self.special_tokens).save(dir)
    }

    /// Load a tokenizer from a directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let LoadedModel {
            vocab,
            merges,
            special_tokens,
        } = TokenizerLoader::load(dir)?;
        Self::new(vocab, merges, special_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytebpe_training::{BpeTrainer, TrainingConfig};

    const CORPUS: &str = "low low low low low lower lower widest widest widest \
                          newest newest newest newest newest newest";

    fn trained(vocab_size: usize, special: &[&str]) -> Tokenizer {
        let config = TrainingConfig::default()
            .with_vocab_size(vocab_size)
            .with_special_tokens(special);
        let model = BpeTrainer::new(config).train(CORPUS).unwrap();
        Tokenizer::from_model(model).unwrap()
    }

    /// Vocabulary with "st" (256) and "est" (257); merges (s,t), (e,st).
    fn handmade() -> Tokenizer {
        let mut vocab = Vocabulary::with_base_bytes();
        vocab.push(b"st");
        vocab.push(b"est");
        vocab.push_special("<|endoftext|>");
        let mut merges = MergeRules::new();
        merges.push(b"s", b"t");
        merges.push(b"e", b"st");
        Tokenizer::new(vocab, merges, ["<|endoftext|>"].into_iter().collect()).unwrap()
    }

    #[test]
    fn test_encode_applies_merges_in_rank_order() {
        let tokenizer = handmade();

        assert_eq!(tokenizer.encode("test").unwrap(), vec![b't' as u32, 257]);
        assert_eq!(tokenizer.encode("st").unwrap(), vec![256]);
        assert_eq!(tokenizer.encode("es").unwrap(), vec![b'e' as u32, b's' as u32]);
    }

    #[test]
    fn test_lower_rank_wins_over_leftmost() {
        let mut vocab = Vocabulary::with_base_bytes();
        vocab.push(b"bc");
        vocab.push(b"ab");
        let mut merges = MergeRules::new();
        merges.push(b"b", b"c");
        merges.push(b"a", b"b");
        let tokenizer = Tokenizer::new(vocab, merges, SpecialTokens::new()).unwrap();

        // (a, b) is leftmost but (b, c) has the lower rank
        assert_eq!(tokenizer.encode("abc").unwrap(), vec![b'a' as u32, 256]);
    }

    #[test]
    fn test_special_tokens_encoded_atomically() {
        let tokenizer = handmade();
        let ids = tokenizer.encode("st<|endoftext|>st").unwrap();

        assert_eq!(ids, vec![256, 258, 256]);
    }

    #[test]
    fn test_unregistered_special_token_is_text() {
        let vocab = Vocabulary::with_base_bytes();
        let tokenizer =
            Tokenizer::new(vocab, MergeRules::new(), ["<pad>"].into_iter().collect()).unwrap();

        assert!(tokenizer.special_tokens().is_empty());
        assert_eq!(tokenizer.special_token_id("<pad>"), None);
        assert_eq!(tokenizer.encode("<pad>").unwrap().len(), 5);
    }

    #[test]
    fn test_invalid_merge_rejected() {
        let vocab = Vocabulary::with_base_bytes();
        let mut merges = MergeRules::new();
        merges.push(b"a", b"b");

        let result = Tokenizer::new(vocab, merges, SpecialTokens::new());
        assert!(matches!(result, Err(TokenizerError::InvalidMerge(_))));
    }

    #[test]
    fn test_missing_byte_is_unknown_token() {
        let vocab = Vocabulary::from_entries([b"a".to_vec()]);
        let tokenizer = Tokenizer::new(vocab, MergeRules::new(), SpecialTokens::new()).unwrap();

        assert_eq!(tokenizer.encode("a").unwrap(), vec![0]);
        assert!(matches!(
            tokenizer.encode("b"),
            Err(TokenizerError::UnknownToken(bytes)) if bytes == b"b".to_vec()
        ));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let tokenizer = trained(300, &["<|endoftext|>"]);

        for text in [
            "",
            "lowest newest",
            "Hello, world!<|endoftext|>  tabs\tand\nnewlines  ",
            "héllo wörld 日本語 🎉 don't we'll",
        ] {
            let ids = tokenizer.encode(text).unwrap();
            assert_eq!(tokenizer.decode(&ids), text);
        }
    }

    #[test]
    fn test_decode_skips_unknown_ids() {
        let tokenizer = handmade();
        assert_eq!(tokenizer.decode(&[b'h' as u32, 99_999, b'i' as u32]), "hi");
    }

    #[test]
    fn test_decode_replaces_invalid_utf8() {
        let tokenizer = handmade();
        // First byte of a two-byte sequence on its own
        assert_eq!(tokenizer.decode(&[0xC3]), "\u{FFFD}");
        assert_eq!(tokenizer.decode_bytes(&[0xC3, 0xA9]), vec![0xC3, 0xA9]);
    }

    #[test]
    fn test_special_token_idempotence() {
        let tokenizer = handmade();
        let id = tokenizer.special_token_id("<|endoftext|>").unwrap();

        assert_eq!(tokenizer.encode("<|endoftext|>").unwrap(), vec![id]);
        assert_eq!(tokenizer.decode(&[id]), "<|endoftext|>");
    }

    #[test]
    fn test_overlapping_special_tokens_longest_wins() {
        let mut vocab = Vocabulary::with_base_bytes();
        let single = vocab.push_special("<|a|>");
        let double = vocab.push_special("<|a|><|a|>");
        let special = ["<|a|>", "<|a|><|a|>"].into_iter().collect();
        let tokenizer = Tokenizer::new(vocab, MergeRules::new(), special).unwrap();

        assert_eq!(
            tokenizer.encode("<|a|><|a|><|a|>").unwrap(),
            vec![double, single]
        );
    }

    #[test]
    fn test_token_lookups() {
        let tokenizer = handmade();

        assert_eq!(tokenizer.id_to_token(257), Some(&b"est"[..]));
        assert_eq!(tokenizer.token_to_id(b"st"), Some(256));
        assert_eq!(tokenizer.token_to_id(b"zzz"), None);
        assert_eq!(tokenizer.vocab_size(), 259);
    }

    #[test]
    fn test_encode_batch_matches_encode() {
        let tokenizer = trained(280, &[]);
        let texts = ["low lower", "newest widest", ""];

        let batch = tokenizer.encode_batch(&texts).unwrap();
        for (text, ids) in texts.iter().zip(&batch) {
            assert_eq!(&tokenizer.encode(text).unwrap(), ids);
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("bytebpe_tok_{}", std::process::id()));
        let tokenizer = trained(290, &["<|endoftext|>"]);
        tokenizer.save(&dir).unwrap();

        let loaded = Tokenizer::load(&dir).unwrap();
        let text = "the newest lowest<|endoftext|>widest";

        assert_eq!(loaded.encode(text).unwrap(), tokenizer.encode(text).unwrap());
        assert_eq!(loaded.vocab_size(), tokenizer.vocab_size());
        std::fs::remove_dir_all(dir).ok();
    }
}
