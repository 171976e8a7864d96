// rust/bilm-data/src/storage/mod.rs

//! Shard storage for line-oriented corpora.
//!
//! A [`ShardStore`] resolves a glob-style file pattern to the set of shard
//! files and reads a whole shard into memory on demand. Datasets hold the
//! store behind an `Arc<dyn ShardStore>`, so tests and alternative backends
//! can be swapped in without touching the loading logic.
//!
//! # Example
//!
//! ```no_run
//! use bilm_data::config::StorageConfig;
//! use bilm_data::storage::{LocalShardStore, ShardStore};
//!
//! let store = LocalShardStore::new(&StorageConfig::default());
//! for shard in store.resolve("corpus/news.en-*-of-00100").unwrap() {
//!     let text = store.read_shard(&shard).unwrap();
//!     println!("{}: {} lines", shard.display(), text.lines().count());
//! }
//! ```

mod local;
mod traits;

pub use local::LocalShardStore;
pub use traits::ShardStore;
