// rust/bilm-data/src/dataset/batch.rs

use std::collections::BTreeMap;

use ndarray::{Array2, Array3, ArrayD};

pub const TOKEN_IDS: &str = "token_ids";
pub const TOKENS_CHARACTERS: &str = "tokens_characters";
pub const NEXT_TOKEN_ID: &str = "next_token_id";

/// Appended to every backward-direction field name in a bidirectional record.
pub const REVERSE_SUFFIX: &str = "_reverse";

/// Field name to array, the shape handed to the training loop.
///
/// `tokens_characters` maps to `None` when character inputs are disabled.
pub type BatchRecord = BTreeMap<String, Option<ArrayD<i32>>>;

/// A fixed-shape training batch for one reading direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Input token ids, `[batch_size, num_steps]`.
    pub token_ids: Array2<i32>,
    /// Input character ids, `[batch_size, num_steps, max_word_length]`.
    pub tokens_characters: Option<Array3<i32>>,
    /// Id of the token following each input, `[batch_size, num_steps]`.
    pub next_token_id: Array2<i32>,
}

impl Batch {
    pub fn batch_size(&self) -> usize {
        self.token_ids.nrows()
    }

    pub fn num_steps(&self) -> usize {
        self.token_ids.ncols()
    }

    pub fn into_record(self) -> BatchRecord {
        let mut record = BatchRecord::new();
        record.insert(TOKEN_IDS.to_string(), Some(self.token_ids.into_dyn()));
        record.insert(
            TOKENS_CHARACTERS.to_string(),
            self.tokens_characters.map(|chars| chars.into_dyn()),
        );
        record.insert(NEXT_TOKEN_ID.to_string(), Some(self.next_token_id.into_dyn()));
        record
    }
}

/// Forward and backward batches produced in the same step.
///
/// Lane `i` of `forward` and lane `i` of `backward` come from independent
/// sentence streams and need not hold the same sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidirectionalBatch {
    pub forward: Batch,
    pub backward: Batch,
}

impl BidirectionalBatch {
    /// Merges both directions into one record: forward fields keep their
    /// names and backward fields get [`REVERSE_SUFFIX`].
    pub fn into_record(self) -> BatchRecord {
        let mut record = self.forward.into_record();
        for (key, value) in self.backward.into_record() {
            record.insert(format!("{}{}", key, REVERSE_SUFFIX), value);
        }
        record
    }
}
