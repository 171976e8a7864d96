// rust/bilm-data/src/vocab/word.rs

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use super::traits::Vocabulary;
use crate::error::{DataError, Result};

pub const BOS_TOKEN: &str = "<S>";
pub const EOS_TOKEN: &str = "</S>";
pub const UNK_TOKEN: &str = "<UNK>";

/// Word-level vocabulary loaded from a one-word-per-line file.
///
/// Ids are assigned in file order. The file must contain the sentence
/// boundary tokens `<S>` and `</S>` and the unknown-word token `<UNK>`.
#[derive(Debug, Clone)]
pub struct WordVocabulary {
    id_to_word: Vec<String>,
    word_to_id: HashMap<String, i32>,
    bos: i32,
    eos: i32,
    unk: i32,
}

impl WordVocabulary {
    /// Loads a vocabulary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or lacks a special token.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DataError::vocab_with_source(
                format!("failed to read vocabulary file {}", path.display()),
                e,
            )
        })?;

        let vocab = Self::from_words(content.lines())?;
        info!("Loaded vocabulary of {} words from {}", vocab.size(), path.display());
        Ok(vocab)
    }

    /// Builds a vocabulary from words in id order. Blank entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a special token is missing or a word repeats.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut id_to_word = Vec::new();
        let mut word_to_id = HashMap::new();

        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() {
                continue;
            }
            let id = i32::try_from(id_to_word.len())
                .map_err(|_| DataError::vocab("vocabulary exceeds i32 id range"))?;
            if word_to_id.insert(word.to_string(), id).is_some() {
                return Err(DataError::vocab(format!("duplicate word '{}'", word)));
            }
            id_to_word.push(word.to_string());
        }

        let special = |token: &str| {
            word_to_id
                .get(token)
                .copied()
                .ok_or_else(|| DataError::vocab(format!("vocabulary is missing {}", token)))
        };
        let bos = special(BOS_TOKEN)?;
        let eos = special(EOS_TOKEN)?;
        let unk = special(UNK_TOKEN)?;

        Ok(Self {
            id_to_word,
            word_to_id,
            bos,
            eos,
            unk,
        })
    }

    pub fn bos(&self) -> i32 {
        self.bos
    }

    pub fn eos(&self) -> i32 {
        self.eos
    }

    pub fn unk(&self) -> i32 {
        self.unk
    }

    pub fn size(&self) -> usize {
        self.id_to_word.len()
    }

    /// Id for a word, falling back to `<UNK>`.
    pub fn word_to_id(&self, word: &str) -> i32 {
        self.word_to_id.get(word).copied().unwrap_or(self.unk)
    }

    pub fn id_to_word(&self, id: i32) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.id_to_word.get(idx))
            .map(String::as_str)
    }

    /// Joins the words for `ids` with single spaces.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is out of range.
    pub fn decode(&self, ids: &[i32]) -> Result<String> {
        let words = ids
            .iter()
            .map(|&id| {
                self.id_to_word(id)
                    .ok_or_else(|| DataError::encoding(format!("id {} is out of vocabulary", id)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(words.join(" "))
    }

    /// Sentence boundary ids in emission order for the given direction.
    fn boundaries(&self, reverse: bool) -> (i32, i32) {
        if reverse {
            (self.eos, self.bos)
        } else {
            (self.bos, self.eos)
        }
    }
}

impl Vocabulary for WordVocabulary {
    fn encode(&self, sentence: &str, reverse: bool) -> Result<Vec<i32>> {
        let (first, last) = self.boundaries(reverse);

        let mut ids = Vec::with_capacity(sentence.len() / 4 + 2);
        ids.push(first);
        ids.extend(sentence.split_whitespace().map(|word| self.word_to_id(word)));
        ids.push(last);
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vocab() -> WordVocabulary {
        WordVocabulary::from_words(["<S>", "</S>", "<UNK>", "the", "cat", "sat"]).unwrap()
    }

    #[test]
    fn test_special_ids() {
        let vocab = vocab();
        assert_eq!(vocab.bos(), 0);
        assert_eq!(vocab.eos(), 1);
        assert_eq!(vocab.unk(), 2);
        assert_eq!(vocab.size(), 6);
    }

    #[test]
    fn test_encode_forward() {
        let vocab = vocab();
        assert_eq!(vocab.encode("the cat sat", false).unwrap(), vec![0, 3, 4, 5, 1]);
    }

    #[test]
    fn test_encode_reverse_swaps_boundaries() {
        let vocab = vocab();
        assert_eq!(vocab.encode("sat cat the", true).unwrap(), vec![1, 5, 4, 3, 0]);
    }

    #[test]
    fn test_encode_unknown_word() {
        let vocab = vocab();
        assert_eq!(vocab.encode("the dog\n", false).unwrap(), vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let vocab = vocab();
        let first = vocab.encode("the cat sat", true).unwrap();
        let second = vocab.encode("the cat sat", true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode() {
        let vocab = vocab();
        assert_eq!(vocab.decode(&[0, 3, 4, 1]).unwrap(), "<S> the cat </S>");
        assert!(vocab.decode(&[42]).is_err());
        assert!(vocab.decode(&[-1]).is_err());
    }

    #[test]
    fn test_missing_special_token() {
        let result = WordVocabulary::from_words(["<S>", "</S>", "the"]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("<UNK>"));
    }

    #[test]
    fn test_duplicate_word() {
        let result = WordVocabulary::from_words(["<S>", "</S>", "<UNK>", "a", "a"]);
        assert!(matches!(result, Err(DataError::Vocab { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<S>\n</S>\n<UNK>\n\nthe\ncat\n").unwrap();

        let vocab = WordVocabulary::from_file(file.path()).unwrap();
        assert_eq!(vocab.size(), 5);
        assert_eq!(vocab.word_to_id("cat"), 4);
        assert_eq!(vocab.id_to_word(3), Some("the"));
    }

    #[test]
    fn test_from_file_not_found() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = WordVocabulary::from_file(temp_dir.path().join("missing.txt"));

        let err = result.unwrap_err();
        assert!(matches!(err, DataError::Vocab { source: Some(_), .. }));
        assert!(err.to_string().contains("missing.txt"));
    }
}
