//! Pre-tokenization: special token isolation followed by word splitting.
//!
//! Both training and encoding see text through the same [`PreTokenizer`], so
//! a word boundary learned during training is the same boundary used when
//! the merges are applied.

pub mod special;
pub mod split;

pub use special::{Segment, SpecialTokenSplitter};
pub use split::{WordSplitter, WORD_PATTERN};

use crate::core::vocab::SpecialTokens;
use crate::error::Result;

/// A unit produced by pre-tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pretoken<'t> {
    /// A word matched by the word pattern
    Word(&'t str),
    /// A special token, never split or merged
    Special(&'t str),
}

/// Special token splitter plus word splitter.
#[derive(Debug, Clone, Default)]
pub struct PreTokenizer {
    special: SpecialTokenSplitter,
    words: WordSplitter,
}

impl PreTokenizer {
    /// Create a pre-tokenizer using the GPT-2 word pattern.
    pub fn new(special: &SpecialTokens) -> Result<Self> {
        Ok(Self {
            special: SpecialTokenSplitter::new(special)?,
            words: WordSplitter::default(),
        })
    }

    /// The special token splitter.
    pub fn special(&self) -> &SpecialTokenSplitter {
        &self.special
    }

    /// The word splitter.
    pub fn words(&self) -> &WordSplitter {
        &self.words
    }

    /// Byte length of the longest special token (0 without special tokens).
    #[inline]
    pub fn max_special_len(&self) -> usize {
        self.special.max_len()
    }

    /// Lazily pre-tokenize `text`.
    pub fn pretokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Result<Pretoken<'a>>> + 'a {
        self.special.segments(text).flat_map(move |segment| {
            let items: Box<dyn Iterator<Item = Result<Pretoken<'a>>> + 'a> = match segment {
                Segment::Special(token) => Box::new(std::iter::once(Ok(Pretoken::Special(token)))),
                Segment::Text(chunk) => {
                    Box::new(self.words.words(chunk).map(|word| word.map(Pretoken::Word)))
                }
            };
            items
        })
    }
}
