// rust/bilm-data/src/vocab/chars.rs

use std::path::Path;

use super::traits::{CharEncoder, Vocabulary};
use super::word::WordVocabulary;
use crate::error::{DataError, Result};

// Reserved character ids, above the 0..=255 byte range.
pub const BOS_CHAR: i32 = 256;
pub const EOS_CHAR: i32 = 257;
pub const BOW_CHAR: i32 = 258;
pub const EOW_CHAR: i32 = 259;
pub const PAD_CHAR: i32 = 260;

/// Word vocabulary with byte-level character encodings.
///
/// Each word becomes a row of `max_word_length` ids: a begin-of-word
/// marker, the word's UTF-8 bytes (truncated to fit), an end-of-word
/// marker, then padding. The sentence boundary tokens are encoded as a
/// single reserved character between the word markers.
#[derive(Debug, Clone)]
pub struct CharVocabulary {
    words: WordVocabulary,
    max_word_length: usize,
}

impl CharVocabulary {
    /// Loads a vocabulary file and enables character encoding.
    pub fn from_file(path: impl AsRef<Path>, max_word_length: usize) -> Result<Self> {
        Self::new(WordVocabulary::from_file(path)?, max_word_length)
    }

    /// # Errors
    ///
    /// Returns an error if `max_word_length` cannot hold the two word
    /// markers plus at least one character.
    pub fn new(words: WordVocabulary, max_word_length: usize) -> Result<Self> {
        if max_word_length < 3 {
            return Err(DataError::vocab(format!(
                "max_word_length must be at least 3, got {}",
                max_word_length
            )));
        }
        Ok(Self {
            words,
            max_word_length,
        })
    }

    pub fn words(&self) -> &WordVocabulary {
        &self.words
    }

    /// Character ids for a single word.
    pub fn word_to_char_ids(&self, word: &str) -> Vec<i32> {
        let bytes = word.as_bytes();
        let bytes = &bytes[..bytes.len().min(self.max_word_length - 2)];

        let mut code = vec![PAD_CHAR; self.max_word_length];
        code[0] = BOW_CHAR;
        for (slot, &byte) in code[1..].iter_mut().zip(bytes) {
            *slot = i32::from(byte);
        }
        code[bytes.len() + 1] = EOW_CHAR;
        code
    }

    fn boundary_char_ids(&self, marker: i32) -> Vec<i32> {
        let mut code = vec![PAD_CHAR; self.max_word_length];
        code[0] = BOW_CHAR;
        code[1] = marker;
        code[2] = EOW_CHAR;
        code
    }
}

impl Vocabulary for CharVocabulary {
    fn encode(&self, sentence: &str, reverse: bool) -> Result<Vec<i32>> {
        self.words.encode(sentence, reverse)
    }

    fn char_encoder(&self) -> Option<&dyn CharEncoder> {
        Some(self)
    }
}

impl CharEncoder for CharVocabulary {
    fn max_word_length(&self) -> usize {
        self.max_word_length
    }

    fn encode_chars(&self, sentence: &str, reverse: bool) -> Result<Vec<Vec<i32>>> {
        let (first, last) = if reverse {
            (EOS_CHAR, BOS_CHAR)
        } else {
            (BOS_CHAR, EOS_CHAR)
        };

        let mut rows = vec![self.boundary_char_ids(first)];
        rows.extend(sentence.split_whitespace().map(|word| self.word_to_char_ids(word)));
        rows.push(self.boundary_char_ids(last));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(max_word_length: usize) -> CharVocabulary {
        let words = WordVocabulary::from_words(["<S>", "</S>", "<UNK>", "ab", "abcdef"]).unwrap();
        CharVocabulary::new(words, max_word_length).unwrap()
    }

    #[test]
    fn test_word_encoding_pads() {
        let vocab = vocab(6);
        assert_eq!(
            vocab.word_to_char_ids("ab"),
            vec![BOW_CHAR, 97, 98, EOW_CHAR, PAD_CHAR, PAD_CHAR]
        );
    }

    #[test]
    fn test_word_encoding_truncates() {
        let vocab = vocab(5);
        assert_eq!(
            vocab.word_to_char_ids("abcdef"),
            vec![BOW_CHAR, 97, 98, 99, EOW_CHAR]
        );
    }

    #[test]
    fn test_encode_chars_aligned_with_tokens() {
        let vocab = vocab(6);
        for reverse in [false, true] {
            let ids = vocab.encode("ab abcdef zz", reverse).unwrap();
            let chars = vocab.encode_chars("ab abcdef zz", reverse).unwrap();
            assert_eq!(ids.len(), chars.len());
            assert!(chars.iter().all(|row| row.len() == 6));
        }
    }

    #[test]
    fn test_encode_chars_boundaries_follow_direction() {
        let vocab = vocab(4);
        let forward = vocab.encode_chars("ab", false).unwrap();
        assert_eq!(forward[0], vec![BOW_CHAR, BOS_CHAR, EOW_CHAR, PAD_CHAR]);
        assert_eq!(forward[2], vec![BOW_CHAR, EOS_CHAR, EOW_CHAR, PAD_CHAR]);

        let backward = vocab.encode_chars("ab", true).unwrap();
        assert_eq!(backward[0], vec![BOW_CHAR, EOS_CHAR, EOW_CHAR, PAD_CHAR]);
        assert_eq!(backward[2], vec![BOW_CHAR, BOS_CHAR, EOW_CHAR, PAD_CHAR]);
    }

    #[test]
    fn test_advertises_char_encoder() {
        let vocab = vocab(8);
        let encoder = vocab.char_encoder().unwrap();
        assert_eq!(encoder.max_word_length(), 8);
        assert!(vocab.words().char_encoder().is_none());
    }

    #[test]
    fn test_rejects_short_word_length() {
        let words = WordVocabulary::from_words(["<S>", "</S>", "<UNK>"]).unwrap();
        assert!(CharVocabulary::new(words, 2).is_err());
    }
}
