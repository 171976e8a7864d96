// rust/bilm-data/src/dataset/pool.rs

use std::collections::VecDeque;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Decides which shard a dataset loads next.
#[derive(Debug, Clone)]
pub enum ShardPool {
    /// Shuffle without replacement: every shard is drawn once before the bag
    /// is refilled and reshuffled.
    Shuffled {
        all: Vec<PathBuf>,
        bag: Vec<PathBuf>,
        epoch: u64,
    },
    /// Destructive, in enumeration order. Empty means end of data.
    Ordered { remaining: VecDeque<PathBuf> },
}

impl ShardPool {
    pub fn shuffled(shards: Vec<PathBuf>) -> Self {
        Self::Shuffled {
            all: shards,
            bag: Vec::new(),
            epoch: 0,
        }
    }

    pub fn ordered(shards: Vec<PathBuf>) -> Self {
        Self::Ordered {
            remaining: shards.into(),
        }
    }

    /// Draws the next shard, or `None` if no shard can ever be drawn again.
    pub fn next_shard(&mut self, rng: &mut StdRng) -> Option<PathBuf> {
        match self {
            Self::Shuffled { all, bag, epoch } => {
                if bag.is_empty() {
                    if all.is_empty() {
                        return None;
                    }
                    bag.extend(all.iter().cloned());
                    bag.shuffle(rng);
                    *epoch += 1;
                    debug!("Shard bag refilled for epoch {}", epoch);
                }
                bag.pop()
            }
            Self::Ordered { remaining } => remaining.pop_front(),
        }
    }
}
