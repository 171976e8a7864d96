// rust/bilm-data/src/vocab/traits.rs

use crate::error::Result;

/// Maps a whitespace-tokenized sentence to token ids.
pub trait Vocabulary: Send + Sync {
    /// Encodes a sentence into token ids.
    ///
    /// `reverse` tells the adapter the sentence's words are already in
    /// backward order, so it can place direction-specific boundary tokens.
    fn encode(&self, sentence: &str, reverse: bool) -> Result<Vec<i32>>;

    /// Character-level encoder, if this vocabulary supports one.
    fn char_encoder(&self) -> Option<&dyn CharEncoder> {
        None
    }
}

/// Per-word character id encoding.
pub trait CharEncoder: Send + Sync {
    /// Width of every per-word character id row.
    fn max_word_length(&self) -> usize;

    /// Encodes a sentence into one character id row per token.
    ///
    /// Rows are positionally aligned with [`Vocabulary::encode`] for the
    /// same sentence and direction, and each row has exactly
    /// [`max_word_length`](CharEncoder::max_word_length) entries.
    fn encode_chars(&self, sentence: &str, reverse: bool) -> Result<Vec<Vec<i32>>>;
}
