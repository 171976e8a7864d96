// rust/bilm-data/src/lib.rs

//! Bidirectional Language Model Data Pipeline
//!
//! This crate feeds sharded, sentence-per-line text corpora to a
//! bidirectional recurrent language model as fixed-shape batches of token
//! (and optionally character) ids, read forward and backward at once,
//! without holding more than one shard per direction in memory.

pub mod config;
pub mod error;
pub mod storage;
pub mod vocab;

// Re-export commonly used types for convenience
pub use config::DataConfig;
pub use error::{DataError, Result};
pub use storage::{LocalShardStore, ShardStore};
pub use vocab::{CharEncoder, CharVocabulary, Vocabulary, WordVocabulary};

pub mod dataset;
pub use dataset::{
    Batch, BatchAssembler, BatchRecord, BidirectionalBatch, BidirectionalLmDataset,
    EncodedSentence, LmDataset,
};

#[cfg(test)]
mod testing;
