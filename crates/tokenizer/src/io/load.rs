//! Load functionality for trained tokenizers.

use super::format::{SerializedTokenizer, FORMAT_VERSION, TOKENIZER_FILE};
use bytebpe_core::pre_tokenizer::WORD_PATTERN;
use bytebpe_core::{MergeRules, Result, SpecialTokens, TokenizerError, Vocabulary};
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Model parts read back from disk.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub vocab: Vocabulary,
    pub merges: MergeRules,
    pub special_tokens: SpecialTokens,
}

/// Tokenizer loader - handles loading trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load a tokenizer from a directory.
    ///
    /// Expects a `tokenizer.json` file in the given directory.
    pub fn load(dir: &Path) -> Result<LoadedModel> {
        let file_path = dir.join(TOKENIZER_FILE);
        let file = File::open(&file_path).map_err(|err| TokenizerError::Io {
            path: file_path.clone(),
            err,
        })?;

        let serialized: SerializedTokenizer = serde_json::from_reader(BufReader::new(file))?;
        let model = Self::deserialize(serialized)?;

        debug!(
            "Loaded {} tokens and {} merges from {}",
            model.vocab.len(),
            model.merges.len(),
            file_path.display()
        );
        Ok(model)
    }

    /// Load a tokenizer from a JSON string.
    pub fn from_json(json: &str) -> Result<LoadedModel> {
        Self::deserialize(serde_json::from_str(json)?)
    }

    /// Validate and rebuild the model.
    ///
    /// Entries may appear in any order but their IDs must be exactly
    /// `0..n` with no gaps or repeats. The saved word pattern must be the
    /// one encoding uses, since merges were learned on its word boundaries.
    pub fn deserialize(data: SerializedTokenizer) -> Result<LoadedModel> {
        if data.version != FORMAT_VERSION {
            return Err(TokenizerError::Load(format!(
                "Unsupported format version {} (expected {})",
                data.version, FORMAT_VERSION
            )));
        }

        if data.config.pattern != WORD_PATTERN {
            return Err(TokenizerError::Load(format!(
                "Unsupported word pattern {:?}",
                data.config.pattern
            )));
        }

        let mut entries = data.vocab;
        entries.sort_by_key(|entry| entry.id);

        for (expected, entry) in entries.iter().enumerate() {
            if entry.id as usize != expected {
                let problem = if (entry.id as usize) < expected {
                    "duplicate"
                } else {
                    "missing"
                };
                return Err(TokenizerError::Load(format!(
                    "Vocabulary IDs must be dense: {} ID near {}",
                    problem, expected
                )));
            }
        }

        Ok(LoadedModel {
            vocab: Vocabulary::from_entries(entries.into_iter().map(|entry| entry.bytes)),
            merges: data.merges,
            special_tokens: data.special_tokens,
        })
    }
}
