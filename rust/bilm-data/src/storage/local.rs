// rust/bilm-data/src/storage/local.rs

//! Local filesystem shard store.
//!
//! Patterns are expanded with `glob`. Shards below the mmap threshold are
//! read through a buffered reader; larger shards are memory-mapped and
//! decoded in place.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use super::traits::ShardStore;
use crate::config::StorageConfig;
use crate::error::{DataError, Result};

/// Shard store backed by the local filesystem.
pub struct LocalShardStore {
    /// Directory that relative patterns are resolved against.
    base_path: PathBuf,
    /// Whether to use memory-mapped I/O.
    use_mmap: bool,
    /// File size threshold above which to use mmap.
    mmap_threshold: u64,
}

impl LocalShardStore {
    /// Creates a new `LocalShardStore` from configuration.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            base_path: config.base_path.clone(),
            use_mmap: config.use_mmap,
            mmap_threshold: config.mmap_threshold,
        }
    }

    /// Resolves a pattern relative to the base path.
    fn resolve_pattern(&self, pattern: &str) -> PathBuf {
        let path = Path::new(pattern);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    fn read_mapped(file: &File, path: &Path) -> Result<String> {
        // SAFETY: The file is opened read-only and the map is dropped before
        // this function returns; the text is copied out.
        let mmap = unsafe { Mmap::map(file) }
            .map_err(|e| DataError::storage_with_source(path, "failed to memory-map shard", e))?;

        std::str::from_utf8(&mmap).map(str::to_owned).map_err(|e| {
            DataError::storage_with_source(
                path,
                "shard is not valid UTF-8",
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }
}

impl ShardStore for LocalShardStore {
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let full_pattern = self.resolve_pattern(pattern);
        let full_pattern = full_pattern
            .to_str()
            .ok_or_else(|| DataError::pattern(pattern, "pattern is not valid UTF-8"))?;

        let entries =
            glob::glob(full_pattern).map_err(|e| DataError::pattern(pattern, e.msg))?;

        let mut shards = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                DataError::storage_with_source(path, "failed to inspect shard", e.into_error())
            })?;

            if path.is_file() {
                shards.push(path);
            }
        }

        shards.sort();
        Ok(shards)
    }

    fn read_shard(&self, path: &Path) -> Result<String> {
        let file = File::open(path)
            .map_err(|e| DataError::storage_with_source(path, "failed to open shard", e))?;

        let size = file
            .metadata()
            .map_err(|e| DataError::storage_with_source(path, "failed to read shard metadata", e))?
            .len();

        // Use mmap for large shards if enabled
        if self.use_mmap && size > 0 && size >= self.mmap_threshold {
            return Self::read_mapped(&file, path);
        }

        let mut text = String::with_capacity(size as usize);
        BufReader::new(file)
            .read_to_string(&mut text)
            .map_err(|e| DataError::storage_with_source(path, "failed to read shard", e))?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store(use_mmap: bool) -> (LocalShardStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig {
            base_path: temp_dir.path().to_path_buf(),
            use_mmap,
            mmap_threshold: 16, // Low threshold for testing
        };
        (LocalShardStore::new(&config), temp_dir)
    }

    fn write_shard(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_resolve_relative_pattern() {
        let (store, temp) = create_test_store(false);
        write_shard(&temp, "train-00002.txt", "b\n");
        write_shard(&temp, "train-00001.txt", "a\n");
        write_shard(&temp, "heldout-00001.txt", "c\n");

        let shards = store.resolve("train-*.txt").unwrap();

        assert_eq!(
            shards,
            vec![
                temp.path().join("train-00001.txt"),
                temp.path().join("train-00002.txt"),
            ]
        );
    }

    #[test]
    fn test_resolve_absolute_pattern() {
        let (store, temp) = create_test_store(false);
        write_shard(&temp, "nested/part-0.txt", "a\n");

        let pattern = temp.path().join("nested").join("*.txt");
        let shards = store.resolve(pattern.to_str().unwrap()).unwrap();
        assert_eq!(shards.len(), 1);
    }

    #[test]
    fn test_resolve_skips_directories() {
        let (store, temp) = create_test_store(false);
        write_shard(&temp, "shard-a", "a\n");
        std::fs::create_dir_all(temp.path().join("shard-dir")).unwrap();

        let shards = store.resolve("shard-*").unwrap();
        assert_eq!(shards, vec![temp.path().join("shard-a")]);
    }

    #[test]
    fn test_resolve_no_matches() {
        let (store, _temp) = create_test_store(false);
        assert!(store.resolve("missing-*.txt").unwrap().is_empty());
    }

    #[test]
    fn test_resolve_invalid_pattern() {
        let (store, _temp) = create_test_store(false);
        let result = store.resolve("shard-[.txt");
        assert!(matches!(result, Err(DataError::Pattern { .. })));
    }

    #[test]
    fn test_read_small_shard() {
        let (store, temp) = create_test_store(true);
        let path = write_shard(&temp, "small.txt", "a b\n");

        assert_eq!(store.read_shard(&path).unwrap(), "a b\n");
    }

    #[test]
    fn test_read_mapped_shard() {
        let (store, temp) = create_test_store(true);
        let content = "the quick brown fox\njumps over the lazy dog\n";
        let path = write_shard(&temp, "large.txt", content);

        assert_eq!(store.read_shard(&path).unwrap(), content);
    }

    #[test]
    fn test_read_missing_shard() {
        let (store, temp) = create_test_store(false);
        let result = store.read_shard(&temp.path().join("gone.txt"));
        assert!(matches!(result, Err(DataError::Storage { .. })));
    }

    #[test]
    fn test_read_invalid_utf8() {
        for use_mmap in [false, true] {
            let (store, temp) = create_test_store(use_mmap);
            let path = temp.path().join("binary.txt");
            std::fs::write(&path, [0x66u8, 0x6f, 0xff, 0xfe, 0x0a].repeat(8)).unwrap();

            let err = store.read_shard(&path).unwrap_err();
            match err {
                DataError::Storage { source, .. } => {
                    assert_eq!(
                        source.unwrap().kind(),
                        std::io::ErrorKind::InvalidData,
                        "use_mmap={}",
                        use_mmap
                    );
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
