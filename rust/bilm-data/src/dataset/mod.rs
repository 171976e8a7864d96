// rust/bilm-data/src/dataset/mod.rs

//! Streaming language model datasets.
//!
//! An [`LmDataset`] turns a set of sentence-per-line shards into an
//! unbounded stream of encoded sentences, holding one shard in memory at a
//! time. A [`BatchAssembler`] packs that stream into fixed-shape
//! `[batch_size, num_steps]` batches with next-token targets, and a
//! [`BidirectionalLmDataset`] runs a forward and a backward pipeline side
//! by side.
//!
//! # Example
//!
//! ```no_run
//! use bilm_data::dataset::BidirectionalLmDataset;
//! use bilm_data::vocab::CharVocabulary;
//! use bilm_data::DataConfig;
//! use std::sync::Arc;
//!
//! let config = DataConfig::from_file("bilm.toml")?.with_env_overrides();
//! let vocab = Arc::new(CharVocabulary::from_file("vocab.txt", 50)?);
//!
//! let data = BidirectionalLmDataset::open(&config, vocab)?;
//! let batches = data.into_batches(config.batching.batch_size, config.batching.num_steps)?;
//! for batch in batches.take(10) {
//!     let record = batch?.into_record();
//!     // record["token_ids"], record["token_ids_reverse"], ...
//! }
//! # Ok::<(), bilm_data::DataError>(())
//! ```

mod batch;
mod batcher;
mod bidirectional;
mod lm;
mod pool;
mod sentence;

pub use batch::{
    Batch, BatchRecord, BidirectionalBatch, NEXT_TOKEN_ID, REVERSE_SUFFIX, TOKENS_CHARACTERS,
    TOKEN_IDS,
};
pub use batcher::BatchAssembler;
pub use bidirectional::{BidirectionalBatches, BidirectionalLmDataset};
pub use lm::LmDataset;
pub use pool::ShardPool;
pub use sentence::EncodedSentence;
