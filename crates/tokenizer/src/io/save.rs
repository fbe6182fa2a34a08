//! Save functionality for trained tokenizers.

use super::format::{
    SerializedConfig, SerializedToken, SerializedTokenizer, FORMAT_VERSION, TOKENIZER_FILE,
};
use bytebpe_core::pre_tokenizer::WORD_PATTERN;
use bytebpe_core::{MergeRules, Result, SpecialTokens, TokenizerError, Vocabulary};
use log::debug;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Tokenizer saver - handles saving trained models.
pub struct TokenizerSaver<'a> {
    /// Vocabulary reference
    vocab: &'a Vocabulary,
    /// Merge rules reference
    merges: &'a MergeRules,
    /// Special tokens reference
    special_tokens: &'a SpecialTokens,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(
        vocab: &'a Vocabulary,
        merges: &'a MergeRules,
        special_tokens: &'a SpecialTokens,
    ) -> Self {
        Self {
            vocab,
            merges,
            special_tokens,
        }
    }

    /// Save the tokenizer to a directory.
    ///
    /// The directory is created if needed and `tokenizer.json` is written
    /// inside it, replacing any previous model.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|err| TokenizerError::Io {
            path: dir.to_path_buf(),
            err,
        })?;

        let file_path = dir.join(TOKENIZER_FILE);
        let io_err = |err| TokenizerError::Io {
            path: file_path.clone(),
            err,
        };

        let file = File::create(&file_path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.serialize())
            .map_err(|e| TokenizerError::Save(format!("Failed to serialize tokenizer: {}", e)))?;
        writer.flush().map_err(io_err)?;

        debug!(
            "Saved {} tokens and {} merges to {}",
            self.vocab.len(),
            self.merges.len(),
            file_path.display()
        );
        Ok(())
    }

    /// Serialize the tokenizer to a structure.
    pub fn serialize(&self) -> SerializedTokenizer {
        let vocab = self
            .vocab
            .iter()
            .map(|(id, bytes)| SerializedToken::new(id, bytes))
            .collect();

        SerializedTokenizer {
            version: FORMAT_VERSION,
            vocab,
            merges: self.merges.clone(),
            special_tokens: self.special_tokens.clone(),
            config: SerializedConfig {
                vocab_size: self.vocab.len(),
                num_merges: self.merges.len(),
                pattern: WORD_PATTERN.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize() {
        let mut vocab = Vocabulary::with_base_bytes();
        vocab.push(b"st");
        vocab.push_special("<s>");
        let mut merges = MergeRules::new();
        merges.push(b"s", b"t");
        let special: SpecialTokens = ["<s>"].into_iter().collect();

        let serialized = TokenizerSaver::new(&vocab, &merges, &special).serialize();

        assert_eq!(serialized.vocab.len(), 258);
        assert_eq!(serialized.vocab[256].bytes, b"st".to_vec());
        assert_eq!(serialized.vocab[257].text.as_deref(), Some("<s>"));
        assert_eq!(serialized.config.num_merges, 1);
        assert_eq!(serialized.version, FORMAT_VERSION);
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = std::env::temp_dir().join(format!("bytebpe_save_{}", std::process::id()));
        let nested = dir.join("nested");
        let vocab = Vocabulary::with_base_bytes();
        let merges = MergeRules::new();
        let special = SpecialTokens::new();

        TokenizerSaver::new(&vocab, &merges, &special)
            .save(&nested)
            .unwrap();

        assert!(nested.join(TOKENIZER_FILE).is_file());
        fs::remove_dir_all(dir).ok();
    }
}
