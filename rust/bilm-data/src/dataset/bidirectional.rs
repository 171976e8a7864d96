// rust/bilm-data/src/dataset/bidirectional.rs

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::config::{DataConfig, DatasetConfig};
use crate::error::Result;
use crate::storage::{LocalShardStore, ShardStore};
use crate::vocab::Vocabulary;

use super::batch::BidirectionalBatch;
use super::batcher::BatchAssembler;
use super::lm::LmDataset;
use super::sentence::EncodedSentence;

/// Forward and backward views of the same corpus, batched in lockstep.
///
/// The two directions keep independent shard rotation and cursors, so a
/// lane's forward and backward rows generally hold different sentences.
pub struct BidirectionalLmDataset {
    forward: LmDataset,
    backward: LmDataset,
}

impl BidirectionalLmDataset {
    /// Creates both directions over `config.file_pattern`.
    ///
    /// With a seed, the backward direction derives its own seed from it so
    /// the two shuffles stay reproducible but distinct.
    pub fn new(
        store: Arc<dyn ShardStore>,
        vocab: Arc<dyn Vocabulary>,
        config: &DatasetConfig,
    ) -> Result<Self> {
        let forward = LmDataset::new(store.clone(), vocab.clone(), config, false)?;

        let backward_config = DatasetConfig {
            seed: config.seed.map(|seed| seed.wrapping_add(1)),
            ..config.clone()
        };
        let backward = LmDataset::new(store, vocab, &backward_config, true)?;

        Ok(Self { forward, backward })
    }

    /// Opens both directions on the local filesystem.
    pub fn open(config: &DataConfig, vocab: Arc<dyn Vocabulary>) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(LocalShardStore::new(&config.storage));
        Self::new(store, vocab, &config.dataset)
    }

    pub fn forward(&self) -> &LmDataset {
        &self.forward
    }

    pub fn backward(&self) -> &LmDataset {
        &self.backward
    }

    pub fn max_word_length(&self) -> Option<usize> {
        self.forward.max_word_length()
    }

    pub fn iter_batches(
        &mut self,
        batch_size: usize,
        num_steps: usize,
    ) -> Result<BidirectionalBatches<&mut LmDataset>> {
        let max_word_length = self.max_word_length();
        Ok(BidirectionalBatches::new(
            BatchAssembler::new(&mut self.forward, batch_size, num_steps, max_word_length)?,
            BatchAssembler::new(&mut self.backward, batch_size, num_steps, max_word_length)?,
        ))
    }

    pub fn into_batches(
        self,
        batch_size: usize,
        num_steps: usize,
    ) -> Result<BidirectionalBatches<LmDataset>> {
        let max_word_length = self.max_word_length();
        Ok(BidirectionalBatches::new(
            BatchAssembler::new(self.forward, batch_size, num_steps, max_word_length)?,
            BatchAssembler::new(self.backward, batch_size, num_steps, max_word_length)?,
        ))
    }
}

/// Pairs one forward and one backward batch per step.
///
/// Ends as soon as either side ends. The forward side is pulled first, so
/// when it runs out the backward side is left untouched.
pub struct BidirectionalBatches<S> {
    forward: BatchAssembler<S>,
    backward: BatchAssembler<S>,
    finished: bool,
}

impl<S> BidirectionalBatches<S>
where
    S: Iterator<Item = Result<EncodedSentence>>,
{
    pub fn new(forward: BatchAssembler<S>, backward: BatchAssembler<S>) -> Self {
        Self {
            forward,
            backward,
            finished: false,
        }
    }

    pub fn next_batch(&mut self) -> Result<Option<BidirectionalBatch>> {
        if self.finished {
            return Ok(None);
        }

        let result = self.zip_next();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    fn zip_next(&mut self) -> Result<Option<BidirectionalBatch>> {
        let Some(forward) = self.forward.next_batch()? else {
            return Ok(None);
        };
        let Some(backward) = self.backward.next_batch()? else {
            return Ok(None);
        };
        Ok(Some(BidirectionalBatch { forward, backward }))
    }
}

impl<S> Iterator for BidirectionalBatches<S>
where
    S: Iterator<Item = Result<EncodedSentence>>,
{
    type Item = Result<BidirectionalBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_batch() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<S> FusedIterator for BidirectionalBatches<S> where S: Iterator<Item = Result<EncodedSentence>> {}
