// rust/bilm-data/src/storage/traits.rs

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Source of corpus shards.
///
/// # Object Safety
///
/// This trait is object-safe and can be used with `Arc<dyn ShardStore>`.
pub trait ShardStore: Send + Sync {
    /// Resolves a file pattern to the shard paths it matches.
    ///
    /// The order of the returned paths carries no meaning; callers shuffle
    /// or consume it as they see fit. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is malformed or a matched entry
    /// cannot be inspected.
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Reads an entire shard as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the shard is missing, unreadable, or not valid
    /// UTF-8.
    fn read_shard(&self, path: &Path) -> Result<String>;
}
