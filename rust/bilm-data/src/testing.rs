// rust/bilm-data/src/testing.rs

//! Fixtures shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{DataError, Result};
use crate::storage::ShardStore;
use crate::vocab::{CharEncoder, Vocabulary};

/// Maps single lowercase letters to `1..=26` with no boundary tokens.
///
/// Any other word fails to encode. With `max_word_length` set, each word
/// also encodes to its bytes padded with zeros.
pub struct LetterVocab {
    max_word_length: Option<usize>,
}

impl LetterVocab {
    pub fn new() -> Self {
        Self {
            max_word_length: None,
        }
    }

    pub fn with_chars(max_word_length: usize) -> Self {
        Self {
            max_word_length: Some(max_word_length),
        }
    }

    pub fn id(letter: char) -> i32 {
        letter as i32 - 'a' as i32 + 1
    }
}

impl Vocabulary for LetterVocab {
    fn encode(&self, sentence: &str, _reverse: bool) -> Result<Vec<i32>> {
        sentence
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_lowercase() => Ok(Self::id(c)),
                    _ => Err(DataError::encoding(format!("unknown word '{}'", word))),
                }
            })
            .collect()
    }

    fn char_encoder(&self) -> Option<&dyn CharEncoder> {
        self.max_word_length.map(|_| self as &dyn CharEncoder)
    }
}

impl CharEncoder for LetterVocab {
    fn max_word_length(&self) -> usize {
        self.max_word_length.unwrap_or(0)
    }

    fn encode_chars(&self, sentence: &str, _reverse: bool) -> Result<Vec<Vec<i32>>> {
        let width = self.max_word_length();
        Ok(sentence
            .split_whitespace()
            .map(|word| {
                let mut row: Vec<i32> = word.bytes().take(width).map(i32::from).collect();
                row.resize(width, 0);
                row
            })
            .collect())
    }
}

/// In-memory shard store.
///
/// `resolve` understands exact names and a single trailing `*`.
#[derive(Default)]
pub struct MemoryStore {
    shards: HashMap<PathBuf, String>,
    unreadable: HashSet<PathBuf>,
    reads: Mutex<Vec<PathBuf>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shard(mut self, name: &str, text: &str) -> Self {
        self.shards.insert(PathBuf::from(name), text.to_string());
        self
    }

    /// A shard that resolves but fails to read.
    pub fn with_unreadable(mut self, name: &str) -> Self {
        self.shards.insert(PathBuf::from(name), String::new());
        self.unreadable.insert(PathBuf::from(name));
        self
    }

    /// Shards read so far, in order.
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }
}

impl ShardStore for MemoryStore {
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let mut matches: Vec<PathBuf> = self
            .shards
            .keys()
            .filter(|path| {
                let name = path.to_str().unwrap_or_default();
                match pattern.strip_suffix('*') {
                    Some(prefix) => name.starts_with(prefix),
                    None => name == pattern,
                }
            })
            .cloned()
            .collect();
        matches.sort();
        Ok(matches)
    }

    fn read_shard(&self, path: &Path) -> Result<String> {
        self.reads.lock().unwrap().push(path.to_path_buf());
        if self.unreadable.contains(path) {
            return Err(DataError::storage_with_source(
                path,
                "failed to open shard",
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        self.shards
            .get(path)
            .cloned()
            .ok_or_else(|| DataError::storage(path, "not found"))
    }
}
