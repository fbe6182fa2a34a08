//! Word splitting for pre-tokenization.
//!
//! Plain text is cut into words with the GPT-2 pattern before any BPE merge
//! is learned or applied. Merges never cross a word boundary.

use crate::error::{Result, TokenizerError};
use fancy_regex::{Matches, Regex};
use std::sync::OnceLock;

/// GPT-2 word pattern. Alternative order matters: vocabularies trained
/// elsewhere with the same pattern depend on it.
pub const WORD_PATTERN: &str =
    r"'(?:[sdmt]|ll|ve|re)| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// Text splitter for pre-tokenization.
#[derive(Debug, Clone)]
pub struct WordSplitter {
    pattern: Regex,
}

impl WordSplitter {
    /// Shared splitter for [`WORD_PATTERN`].
    pub fn gpt2() -> &'static WordSplitter {
        static SPLITTER: OnceLock<WordSplitter> = OnceLock::new();
        SPLITTER.get_or_init(|| WordSplitter {
            pattern: Regex::new(WORD_PATTERN).expect("WORD_PATTERN is a valid regex"),
        })
    }

    /// Lazily split `text` into words. Empty matches are skipped.
    pub fn words<'r, 't>(&'r self, text: &'t str) -> Words<'r, 't> {
        Words {
            matches: self.pattern.find_iter(text),
        }
    }

    /// Byte ranges of every word in `text`.
    pub fn word_spans(&self, text: &str) -> Result<Vec<(usize, usize)>> {
        let mut spans = Vec::new();
        for m in self.pattern.find_iter(text) {
            let m = m?;
            if !m.as_str().is_empty() {
                spans.push((m.start(), m.end()));
            }
        }
        Ok(spans)
    }
}

impl Default for WordSplitter {
    fn default() -> Self {
        Self::gpt2().clone()
    }
}

/// Iterator over the words of one text span.
pub struct Words<'r, 't> {
    matches: Matches<'r, 't>,
}

impl<'r, 't> Iterator for Words<'r, 't> {
    type Item = Result<&'t str>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.matches.next()? {
                Ok(m) if m.as_str().is_empty() => continue,
                Ok(m) => return Some(Ok(m.as_str())),
                Err(err) => return Some(Err(TokenizerError::from(err))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<&str> {
        WordSplitter::gpt2()
            .words(text)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_letters_and_leading_space() {
        assert_eq!(split("low lower"), vec!["low", " lower"]);
    }

    #[test]
    fn test_contractions() {
        assert_eq!(
            split("we'll they've I'm it's"),
            vec!["we", "'ll", " they", "'ve", " I", "'m", " it", "'s"]
        );
    }

    #[test]
    fn test_digits_and_punctuation() {
        assert_eq!(split("abc 123!?"), vec!["abc", " 123", "!?"]);
    }

    #[test]
    fn test_whitespace_runs() {
        // Trailing space before a word stays with the word
        assert_eq!(split("a   b"), vec!["a", "  ", " b"]);
        // Whitespace at the end of the text is one token
        assert_eq!(split("a  \n"), vec!["a", "  \n"]);
    }

    #[test]
    fn test_unicode_letters() {
        assert_eq!(split("héllo wörld"), vec!["héllo", " wörld"]);
    }

    #[test]
    fn test_empty_string() {
        assert!(split("").is_empty());
    }

    #[test]
    fn test_word_spans() {
        let spans = WordSplitter::gpt2().word_spans("hi there").unwrap();
        assert_eq!(spans, vec![(0, 2), (2, 8)]);
    }
}
