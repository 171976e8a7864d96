// rust/bilm-data/src/dataset/sentence.rs

use ndarray::Array2;

use crate::error::{DataError, Result};

/// One sentence after vocabulary encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSentence {
    pub token_ids: Vec<i32>,
    /// Per-token character ids, shape `[token_ids.len(), max_word_length]`.
    pub char_ids: Option<Array2<i32>>,
}

impl EncodedSentence {
    pub fn new(token_ids: Vec<i32>) -> Self {
        Self {
            token_ids,
            char_ids: None,
        }
    }

    /// Pairs token ids with per-token character rows of width `max_word_length`.
    ///
    /// # Errors
    ///
    /// Returns an error if the row count differs from the token count or a
    /// row has the wrong width.
    pub fn with_char_rows(
        token_ids: Vec<i32>,
        rows: Vec<Vec<i32>>,
        max_word_length: usize,
    ) -> Result<Self> {
        if rows.len() != token_ids.len() {
            return Err(DataError::encoding(format!(
                "{} character rows for {} tokens",
                rows.len(),
                token_ids.len()
            )));
        }

        let mut flat = Vec::with_capacity(rows.len() * max_word_length);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != max_word_length {
                return Err(DataError::encoding(format!(
                    "character row {} has width {}, expected {}",
                    idx,
                    row.len(),
                    max_word_length
                )));
            }
            flat.extend(row);
        }

        let char_ids = Array2::from_shape_vec((token_ids.len(), max_word_length), flat)
            .map_err(|e| DataError::encoding(e.to_string()))?;

        Ok(Self {
            token_ids,
            char_ids: Some(char_ids),
        })
    }

    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }
}
