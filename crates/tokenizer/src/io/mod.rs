//! Serialization and deserialization for BPE models.
//!
//! This module saves trained tokenizers as JSON and loads them back.

pub mod format;
pub mod load;
pub mod save;

pub use format::{SerializedTokenizer, FORMAT_VERSION, TOKENIZER_FILE};
pub use load::{LoadedModel, TokenizerLoader};
pub use save::TokenizerSaver;
