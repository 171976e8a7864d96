// rust/bilm-data/src/dataset/batcher.rs

use std::iter::FusedIterator;

use ndarray::{s, Array2, Array3, ArrayView1, ArrayViewMut1, ArrayViewMut2};
use tracing::debug;

use crate::error::{DataError, Result};

use super::batch::Batch;
use super::sentence::EncodedSentence;

/// Packs a stream of sentences into fixed-shape `[batch_size, num_steps]`
/// batches.
///
/// Every row of the batch is a lane with its own in-flight sentence. A lane
/// fills its row by draining that sentence and pulls the next one from the
/// source when fewer than two tokens are left, so a sentence can span
/// several consecutive batches of the same lane. Targets are always the
/// following token of the same sentence.
///
/// When the source ends while a batch is being filled, that partial batch
/// is dropped and the iterator ends. Sentences of fewer than two tokens
/// never yield an input/target pair and are skipped entirely.
pub struct BatchAssembler<S> {
    source: S,
    batch_size: usize,
    num_steps: usize,
    max_word_length: Option<usize>,
    lanes: Vec<Lane>,
    batch_index: u64,
    finished: bool,
}

/// The unconsumed tail of a lane's current sentence, `sentence[offset..]`.
#[derive(Debug, Default)]
struct Lane {
    sentence: Option<EncodedSentence>,
    offset: usize,
}

impl Lane {
    fn remaining(&self) -> usize {
        self.sentence
            .as_ref()
            .map_or(0, |sentence| sentence.len().saturating_sub(self.offset))
    }

    fn refill(&mut self, sentence: EncodedSentence) {
        self.sentence = Some(sentence);
        self.offset = 0;
    }

    /// Copies as many input/target pairs as fit into the given row views and
    /// advances the offset past the copied inputs.
    fn drain_into(
        &mut self,
        mut inputs: ArrayViewMut1<'_, i32>,
        mut targets: ArrayViewMut1<'_, i32>,
        chars: Option<ArrayViewMut2<'_, i32>>,
    ) -> Result<usize> {
        let Some(sentence) = self.sentence.as_ref() else {
            return Ok(0);
        };

        let start = self.offset;
        let how_many = self.remaining().saturating_sub(1).min(inputs.len());
        let end = start + how_many;

        inputs
            .slice_mut(s![..how_many])
            .assign(&ArrayView1::from(&sentence.token_ids[start..end]));
        targets
            .slice_mut(s![..how_many])
            .assign(&ArrayView1::from(&sentence.token_ids[start + 1..end + 1]));

        if let Some(mut chars) = chars {
            let source = sentence
                .char_ids
                .as_ref()
                .ok_or_else(|| DataError::encoding("sentence is missing character ids"))?;
            if source.ncols() != chars.ncols() {
                return Err(DataError::encoding(format!(
                    "character rows have width {}, expected {}",
                    source.ncols(),
                    chars.ncols()
                )));
            }
            chars
                .slice_mut(s![..how_many, ..])
                .assign(&source.slice(s![start..end, ..]));
        }

        self.offset = end;
        Ok(how_many)
    }
}

impl<S> BatchAssembler<S>
where
    S: Iterator<Item = Result<EncodedSentence>>,
{
    /// Creates an assembler over `source`.
    ///
    /// With `max_word_length` set, batches also carry character ids and
    /// every sentence must provide them.
    ///
    /// # Errors
    ///
    /// Returns an error if any dimension is zero.
    pub fn new(
        source: S,
        batch_size: usize,
        num_steps: usize,
        max_word_length: Option<usize>,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(DataError::config("batch_size must be greater than 0"));
        }
        if num_steps == 0 {
            return Err(DataError::config("num_steps must be greater than 0"));
        }
        if max_word_length == Some(0) {
            return Err(DataError::config("max_word_length must be greater than 0"));
        }

        Ok(Self {
            source,
            batch_size,
            num_steps,
            max_word_length,
            lanes: (0..batch_size).map(|_| Lane::default()).collect(),
            batch_index: 0,
            finished: false,
        })
    }

    /// Assembles the next batch.
    ///
    /// Returns `Ok(None)` once the source is exhausted. After an error or
    /// the end of data every further call returns `Ok(None)`.
    pub fn next_batch(&mut self) -> Result<Option<Batch>> {
        if self.finished {
            return Ok(None);
        }

        let result = self.fill_batch();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    fn fill_batch(&mut self) -> Result<Option<Batch>> {
        let shape = (self.batch_size, self.num_steps);
        let mut token_ids = Array2::<i32>::zeros(shape);
        let mut next_token_id = Array2::<i32>::zeros(shape);
        let mut tokens_characters = self
            .max_word_length
            .map(|width| Array3::<i32>::zeros((self.batch_size, self.num_steps, width)));

        for lane in 0..self.batch_size {
            let mut pos = 0;
            while pos < self.num_steps {
                if self.lanes[lane].remaining() <= 1 {
                    match self.source.next() {
                        Some(Ok(sentence)) => {
                            self.lanes[lane].refill(sentence);
                            continue;
                        }
                        Some(Err(e)) => return Err(e),
                        None => {
                            debug!(
                                "Source exhausted; dropping partial batch {}",
                                self.batch_index
                            );
                            return Ok(None);
                        }
                    }
                }

                pos += self.lanes[lane].drain_into(
                    token_ids.slice_mut(s![lane, pos..]),
                    next_token_id.slice_mut(s![lane, pos..]),
                    tokens_characters
                        .as_mut()
                        .map(|chars| chars.slice_mut(s![lane, pos.., ..])),
                )?;
            }
        }

        self.batch_index += 1;
        Ok(Some(Batch {
            token_ids,
            tokens_characters,
            next_token_id,
        }))
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn max_word_length(&self) -> Option<usize> {
        self.max_word_length
    }

    /// Number of batches emitted so far.
    pub fn batches_emitted(&self) -> u64 {
        self.batch_index
    }
}

impl<S> Iterator for BatchAssembler<S>
where
    S: Iterator<Item = Result<EncodedSentence>>,
{
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_batch() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<S> FusedIterator for BatchAssembler<S> where S: Iterator<Item = Result<EncodedSentence>> {}
