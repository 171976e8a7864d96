// rust/bilm-data/src/dataset/lm.rs

use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::{DataConfig, DatasetConfig};
use crate::error::{DataError, Result};
use crate::storage::{LocalShardStore, ShardStore};
use crate::vocab::Vocabulary;

use super::batcher::BatchAssembler;
use super::pool::ShardPool;
use super::sentence::EncodedSentence;

/// A language model dataset read in one direction.
///
/// The dataset is a set of shard files, each holding one pre-tokenized,
/// whitespace-joined sentence per line. Only the current shard is held in
/// memory. Sentences are pulled one at a time through
/// [`next_sentence`](Self::next_sentence) or the `Iterator` impl; when the
/// loaded shard runs out the next one is chosen and loaded.
///
/// In test mode shards are visited once, in enumeration order, and the
/// sentence stream ends after the last one. Otherwise shards are drawn from
/// a shuffle bag and the stream never ends.
pub struct LmDataset {
    store: Arc<dyn ShardStore>,
    vocab: Arc<dyn Vocabulary>,
    file_pattern: String,
    shard_count: usize,
    pool: ShardPool,
    rng: StdRng,
    reverse: bool,
    test: bool,
    shuffle_on_load: bool,
    max_word_length: Option<usize>,
    sentences: VecDeque<EncodedSentence>,
    current_shard: Option<PathBuf>,
    exhausted: bool,
}

impl LmDataset {
    /// Resolves the shards for `config.file_pattern` and loads the first one.
    ///
    /// A pattern that matches nothing is not an error here: in test mode
    /// the stream is simply empty, otherwise the first pull fails with
    /// [`DataError::NoShards`].
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern cannot be resolved or the first
    /// shard fails to load.
    pub fn new(
        store: Arc<dyn ShardStore>,
        vocab: Arc<dyn Vocabulary>,
        config: &DatasetConfig,
        reverse: bool,
    ) -> Result<Self> {
        let mut shards = store.resolve(&config.file_pattern)?;
        shards.sort();
        shards.dedup();
        info!("Found {} shards at {}", shards.len(), config.file_pattern);
        if shards.is_empty() {
            warn!("No shards match {}", config.file_pattern);
        }

        let shard_count = shards.len();
        let pool = if config.test {
            ShardPool::ordered(shards)
        } else {
            ShardPool::shuffled(shards)
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let max_word_length = vocab.char_encoder().map(|encoder| encoder.max_word_length());

        let mut dataset = Self {
            store,
            vocab,
            file_pattern: config.file_pattern.clone(),
            shard_count,
            pool,
            rng,
            reverse,
            test: config.test,
            shuffle_on_load: config.shuffle_on_load,
            max_word_length,
            sentences: VecDeque::new(),
            current_shard: None,
            exhausted: false,
        };

        if shard_count > 0 {
            dataset.load_next_shard()?;
        }
        Ok(dataset)
    }

    /// Opens a dataset on the local filesystem.
    pub fn open(config: &DataConfig, vocab: Arc<dyn Vocabulary>, reverse: bool) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(LocalShardStore::new(&config.storage));
        Self::new(store, vocab, &config.dataset, reverse)
    }

    /// Picks the next shard to load, or `None` when no shard is left.
    pub fn choose_next_shard(&mut self) -> Option<PathBuf> {
        self.pool.next_shard(&mut self.rng)
    }

    /// Reads and encodes every sentence of one shard.
    ///
    /// In reverse mode the word order of each line is reversed before
    /// encoding. With `shuffle_on_load` the sentence order is shuffled.
    ///
    /// # Errors
    ///
    /// Returns an error if the shard cannot be read or a sentence fails to
    /// encode.
    pub fn load_shard(&mut self, path: &Path) -> Result<Vec<EncodedSentence>> {
        info!("Loading data from {}", path.display());
        let text = self.store.read_shard(path)?;

        let mut lines: Vec<Cow<'_, str>> = if self.reverse {
            text.lines().map(|line| Cow::Owned(reverse_words(line))).collect()
        } else {
            text.lines().map(Cow::Borrowed).collect()
        };

        if self.shuffle_on_load {
            lines.shuffle(&mut self.rng);
        }

        let sentences = lines
            .iter()
            .map(|line| self.encode(line))
            .collect::<Result<Vec<_>>>()?;
        info!("Loaded {} sentences", sentences.len());
        Ok(sentences)
    }

    /// Pulls the next sentence, loading a new shard when the current one is
    /// used up.
    ///
    /// Returns `Ok(None)` only in test mode, once every shard has been read.
    pub fn next_sentence(&mut self) -> Result<Option<EncodedSentence>> {
        if self.sentences.is_empty() && (self.exhausted || !self.load_next_shard()?) {
            return Ok(None);
        }
        Ok(self.sentences.pop_front())
    }

    /// Batches this dataset's sentences without consuming the dataset.
    pub fn iter_batches(
        &mut self,
        batch_size: usize,
        num_steps: usize,
    ) -> Result<BatchAssembler<&mut Self>> {
        let max_word_length = self.max_word_length;
        BatchAssembler::new(self, batch_size, num_steps, max_word_length)
    }

    pub fn into_batches(self, batch_size: usize, num_steps: usize) -> Result<BatchAssembler<Self>> {
        let max_word_length = self.max_word_length;
        BatchAssembler::new(self, batch_size, num_steps, max_word_length)
    }

    /// Width of the character rows, or `None` without character inputs.
    pub fn max_word_length(&self) -> Option<usize> {
        self.max_word_length
    }

    pub fn vocab(&self) -> &Arc<dyn Vocabulary> {
        &self.vocab
    }

    /// Number of shards the pattern matched.
    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    pub fn current_shard(&self) -> Option<&Path> {
        self.current_shard.as_deref()
    }

    /// Sentences of the current shard not yet pulled.
    pub fn remaining_in_shard(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn is_test(&self) -> bool {
        self.test
    }

    /// Replaces the sentence buffer with the next non-empty shard.
    ///
    /// Returns `Ok(false)` at the end of test-mode data.
    fn load_next_shard(&mut self) -> Result<bool> {
        let mut empty_shards = HashSet::new();

        loop {
            let Some(path) = self.choose_next_shard() else {
                if self.test {
                    self.exhausted = true;
                    return Ok(false);
                }
                return Err(DataError::no_shards(&self.file_pattern));
            };

            let sentences = self.load_shard(&path)?;
            self.current_shard = Some(path.clone());

            if !sentences.is_empty() {
                self.sentences = sentences.into();
                return Ok(true);
            }

            warn!("Skipping empty shard {}", path.display());
            empty_shards.insert(path);
            if !self.test && empty_shards.len() >= self.shard_count {
                return Err(DataError::dataset(&self.file_pattern, "every shard is empty"));
            }
        }
    }

    fn encode(&self, sentence: &str) -> Result<EncodedSentence> {
        let token_ids = self.vocab.encode(sentence, self.reverse)?;

        let Some(max_word_length) = self.max_word_length else {
            return Ok(EncodedSentence::new(token_ids));
        };
        let encoder = self
            .vocab
            .char_encoder()
            .ok_or_else(|| DataError::encoding("vocabulary no longer provides character ids"))?;
        let rows = encoder.encode_chars(sentence, self.reverse)?;
        EncodedSentence::with_char_rows(token_ids, rows, max_word_length)
    }
}

impl Iterator for LmDataset {
    type Item = Result<EncodedSentence>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_sentence() {
            Ok(Some(sentence)) => Some(Ok(sentence)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Reverses the word order of a line; characters within a word are kept.
fn reverse_words(line: &str) -> String {
    let mut words: Vec<&str> = line.split_whitespace().collect();
    words.reverse();
    words.join(" ")
}
