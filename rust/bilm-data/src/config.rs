// rust/bilm-data/src/config.rs

//! Configuration for the language model data pipeline.
//!
//! Configuration is parsed from TOML, can be overridden from `BILM_`
//! environment variables, and is validated before a dataset is opened.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{DataError, Result};

// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub storage: StorageConfig,
    pub dataset: DatasetConfig,
    pub batching: BatchConfig,
}

// Where shards live and how they are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory that relative file patterns are resolved against.
    pub base_path: PathBuf,
    // Whether to memory-map large shards.
    pub use_mmap: bool,
    // Shard size threshold (bytes) at or above which to use mmap.
    pub mmap_threshold: u64,
}

/// Shard selection and per-shard loading options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Glob pattern matching the corpus shards.
    pub file_pattern: String,
    /// Consume shards once, in order, and stop when they run out.
    pub test: bool,
    /// Shuffle sentence order within each loaded shard.
    pub shuffle_on_load: bool,
    // Optional seed for reproducible shard rotation and shuffling.
    pub seed: Option<u64>,
}

// Shape of the emitted batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    // Number of lanes (rows) per batch.
    pub batch_size: usize,
    // Number of time steps (columns) per batch.
    pub num_steps: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            use_mmap: true,
            mmap_threshold: 16 * 1024 * 1024, // 16 MB
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            file_pattern: String::new(),
            test: false,
            shuffle_on_load: false,
            seed: None,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 128,
            num_steps: 20,
        }
    }
}

impl DatasetConfig {
    /// Shorthand for a dataset over `file_pattern` with default options.
    pub fn new(file_pattern: impl Into<String>) -> Self {
        Self {
            file_pattern: file_pattern.into(),
            ..Default::default()
        }
    }
}

impl FromStr for DataConfig {
    type Err = DataError;

    /// Parse configuration from a TOML string.
    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| DataError::config_with_source("failed to parse TOML config", e))
    }
}

impl DataConfig {
    // Load configuration from a TOML file.
    //
    // # Errors
    //
    // Returns an error if the file cannot be read, parsed, or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DataError::storage_with_source(path, "failed to read config file", e))?;
        let config: Self = content.parse()?;
        config.validate()?;
        Ok(config)
    }

    // Apply environment variable overrides.
    //
    // Variables are prefixed with `BILM_` and name the section and field,
    // e.g. `BILM_DATASET_FILE_PATTERN` overrides `dataset.file_pattern` and
    // `BILM_BATCHING_NUM_STEPS` overrides `batching.num_steps`. Values that
    // fail to parse are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        // Storage overrides
        if let Ok(val) = std::env::var("BILM_STORAGE_BASE_PATH") {
            self.storage.base_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("BILM_STORAGE_USE_MMAP") {
            if let Ok(v) = val.parse() {
                self.storage.use_mmap = v;
            }
        }
        if let Ok(val) = std::env::var("BILM_STORAGE_MMAP_THRESHOLD") {
            if let Ok(v) = val.parse() {
                self.storage.mmap_threshold = v;
            }
        }

        // Dataset overrides
        if let Ok(val) = std::env::var("BILM_DATASET_FILE_PATTERN") {
            self.dataset.file_pattern = val;
        }
        if let Ok(val) = std::env::var("BILM_DATASET_TEST") {
            if let Ok(v) = val.parse() {
                self.dataset.test = v;
            }
        }
        if let Ok(val) = std::env::var("BILM_DATASET_SHUFFLE_ON_LOAD") {
            if let Ok(v) = val.parse() {
                self.dataset.shuffle_on_load = v;
            }
        }
        if let Ok(val) = std::env::var("BILM_DATASET_SEED") {
            if let Ok(v) = val.parse() {
                self.dataset.seed = Some(v);
            }
        }

        // Batching overrides
        if let Ok(val) = std::env::var("BILM_BATCHING_BATCH_SIZE") {
            if let Ok(v) = val.parse() {
                self.batching.batch_size = v;
            }
        }
        if let Ok(val) = std::env::var("BILM_BATCHING_NUM_STEPS") {
            if let Ok(v) = val.parse() {
                self.batching.num_steps = v;
            }
        }

        self
    }

    // Validate all configuration values.
    //
    // # Errors
    //
    // Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.use_mmap && self.storage.mmap_threshold == 0 {
            return Err(DataError::config(
                "storage.mmap_threshold must be greater than 0 when use_mmap is set",
            ));
        }

        if self.dataset.file_pattern.trim().is_empty() {
            return Err(DataError::config("dataset.file_pattern must not be empty"));
        }

        if self.batching.batch_size == 0 {
            return Err(DataError::config(
                "batching.batch_size must be greater than 0",
            ));
        }
        if self.batching.num_steps == 0 {
            return Err(DataError::config(
                "batching.num_steps must be greater than 0",
            ));
        }

        Ok(())
    }
}
