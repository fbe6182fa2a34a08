//! Special token isolation.
//!
//! Special tokens are matched literally, longest first, and cut out of the
//! text before the word pattern runs so that no merge ever spans one.

use crate::core::vocab::SpecialTokens;
use crate::error::Result;
use regex::{Matches, Regex};

/// A piece of text produced by [`SpecialTokenSplitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    /// Ordinary text between special tokens
    Text(&'t str),
    /// An exact special token occurrence
    Special(&'t str),
}

/// Splits text around special tokens.
#[derive(Debug, Clone, Default)]
pub struct SpecialTokenSplitter {
    /// `None` when there are no special tokens
    pattern: Option<Regex>,
    max_len: usize,
}

impl SpecialTokenSplitter {
    /// Build the longest-first alternation for `special`.
    pub fn new(special: &SpecialTokens) -> Result<Self> {
        if special.is_empty() {
            return Ok(Self::default());
        }

        let alternation = special
            .longest_first()
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            pattern: Some(Regex::new(&alternation)?),
            max_len: special.max_len(),
        })
    }

    /// Byte length of the longest special token.
    #[inline]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Check if any special token is configured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    /// Byte ranges of every special token occurrence in `text`.
    pub fn find_iter<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.pattern
            .iter()
            .flat_map(move |re| re.find_iter(text).map(|m| (m.start(), m.end())))
    }

    /// Lazily split `text` into text and special segments.
    pub fn segments<'r, 't>(&'r self, text: &'t str) -> Segments<'r, 't> {
        Segments {
            text,
            matches: self.pattern.as_ref().map(|re| re.find_iter(text)),
            pos: 0,
            pending: None,
        }
    }
}

/// Iterator returned by [`SpecialTokenSplitter::segments`].
pub struct Segments<'r, 't> {
    text: &'t str,
    matches: Option<Matches<'r, 't>>,
    pos: usize,
    pending: Option<&'t str>,
}

impl<'r, 't> Iterator for Segments<'r, 't> {
    type Item = Segment<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(special) = self.pending.take() {
            return Some(Segment::Special(special));
        }

        if let Some(m) = self.matches.as_mut().and_then(|it| it.next()) {
            let before = &self.text[self.pos..m.start()];
            self.pos = m.end();
            if before.is_empty() {
                return Some(Segment::Special(m.as_str()));
            }
            self.pending = Some(m.as_str());
            return Some(Segment::Text(before));
        }

        if self.pos < self.text.len() {
            let rest = &self.text[self.pos..];
            self.pos = self.text.len();
            return Some(Segment::Text(rest));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(tokens: &[&str]) -> SpecialTokenSplitter {
        SpecialTokenSplitter::new(&tokens.iter().collect()).unwrap()
    }

    #[test]
    fn test_no_special_tokens() {
        let s = splitter(&[]);
        assert!(s.is_empty());
        assert_eq!(s.segments("a<b>c").collect::<Vec<_>>(), vec![Segment::Text("a<b>c")]);
        assert_eq!(s.segments("").count(), 0);
    }

    #[test]
    fn test_segments_alternate() {
        let s = splitter(&["<|endoftext|>"]);
        let segments: Vec<_> = s.segments("Hi<|endoftext|>there").collect();

        assert_eq!(
            segments,
            vec![
                Segment::Text("Hi"),
                Segment::Special("<|endoftext|>"),
                Segment::Text("there"),
            ]
        );
    }

    #[test]
    fn test_adjacent_specials_skip_empty_text() {
        let s = splitter(&["<s>"]);
        let segments: Vec<_> = s.segments("<s><s>x").collect();

        assert_eq!(
            segments,
            vec![Segment::Special("<s>"), Segment::Special("<s>"), Segment::Text("x")]
        );
    }

    #[test]
    fn test_longest_first() {
        let s = splitter(&["<|a|>", "<|a|><|a|>"]);
        let segments: Vec<_> = s.segments("<|a|><|a|><|a|>").collect();

        assert_eq!(
            segments,
            vec![Segment::Special("<|a|><|a|>"), Segment::Special("<|a|>")]
        );
        assert_eq!(s.max_len(), 10);
    }

    #[test]
    fn test_tokens_are_literal() {
        let s = splitter(&["[.*]"]);
        let segments: Vec<_> = s.segments("ab[.*]").collect();
        assert_eq!(segments, vec![Segment::Text("ab"), Segment::Special("[.*]")]);
    }

    #[test]
    fn test_find_iter() {
        let s = splitter(&["<s>"]);
        assert_eq!(s.find_iter("a<s>b<s>").collect::<Vec<_>>(), vec![(1, 4), (5, 8)]);
    }
}
