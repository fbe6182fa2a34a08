//! Streaming encode over a sequence of text chunks.
//!
//! Chunks are appended to a pending buffer. Text is only encoded once no
//! later chunk can change how it is split: a special token match is final
//! when no longer special token starting at or before it could still be
//! completing, and a word is final when at least two more words follow it.
//! A word's extent can depend on up to three bytes past its start (`'ll`),
//! so the last two words of the buffer may still change.

use super::Tokenizer;
use crate::utils::EncodingCache;
use bytebpe_core::Result;
use std::collections::VecDeque;

/// Words kept back at the end of the buffer.
const HELD_WORDS: usize = 2;

/// Lazy iterator returned by [`Tokenizer::encode_iterable`].
///
/// Yields exactly the IDs of encoding the concatenation of all chunks. An
/// error ends the stream.
pub struct EncodeIter<'t, I> {
    tokenizer: &'t Tokenizer,
    chunks: I,
    /// Text received but not yet encoded
    buffer: String,
    /// IDs encoded but not yet yielded
    ready: VecDeque<u32>,
    cache: EncodingCache,
    done: bool,
}

impl<'t, I> EncodeIter<'t, I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub(crate) fn new(tokenizer: &'t Tokenizer, chunks: I) -> Self {
        Self {
            tokenizer,
            chunks,
            buffer: String::new(),
            ready: VecDeque::new(),
            cache: EncodingCache::new(),
            done: false,
        }
    }

    /// Word cache statistics so far.
    pub fn cache(&self) -> &EncodingCache {
        &self.cache
    }

    /// Bytes received but not yet encoded.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Encode everything in the buffer that later input cannot change.
    fn flush_settled(&mut self) -> Result<()> {
        let tokenizer = self.tokenizer;
        let pre = tokenizer.pre_tokenizer();
        let max_special = pre.max_special_len();
        let buf = self.buffer.as_str();
        let mut out = Vec::new();
        let mut consumed = 0;

        for (start, end) in pre.special().find_iter(buf) {
            if start + max_special > buf.len() {
                break;
            }
            tokenizer.encode_into(&buf[consumed..start], &mut out, Some(&mut self.cache))?;
            tokenizer.encode_into(&buf[start..end], &mut out, None)?;
            consumed = end;
        }

        // A special token starting at or after `limit` might not be complete
        let mut limit = if max_special == 0 {
            buf.len()
        } else {
            (buf.len() + 1).saturating_sub(max_special).max(consumed)
        };
        while !buf.is_char_boundary(limit) {
            limit -= 1;
        }

        if limit > consumed {
            let plain = &buf[consumed..limit];
            let spans = pre.words().word_spans(plain)?;
            if spans.len() > HELD_WORDS {
                for &(start, end) in &spans[..spans.len() - HELD_WORDS] {
                    let word = &plain[start..end];
                    self.cache
                        .encode_into(word, &mut out, |w| tokenizer.encode_word(w))?;
                }
                consumed += spans[spans.len() - HELD_WORDS - 1].1;
            }
        }

        self.buffer.drain(..consumed);
        self.ready.extend(out);
        Ok(())
    }

    /// Encode whatever is left once the input is exhausted.
    fn flush_all(&mut self) -> Result<()> {
        let mut out = Vec::new();
        self.tokenizer
            .encode_into(&self.buffer, &mut out, Some(&mut self.cache))?;
        self.buffer.clear();
        self.ready.extend(out);
        Ok(())
    }
}

impl<'t, I> Iterator for EncodeIter<'t, I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.ready.pop_front() {
                return Some(Ok(id));
            }
            if self.done {
                return None;
            }

            let step = match self.chunks.next() {
                Some(chunk) => {
                    self.buffer.push_str(chunk.as_ref());
                    self.flush_settled()
                }
                None => {
                    self.done = true;
                    self.flush_all()
                }
            };

            if let Err(err) = step {
                self.done = true;
                self.buffer.clear();
                self.ready.clear();
                return Some(Err(err));
            }
        }
    }
}
