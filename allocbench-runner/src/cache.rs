//! Simulation-result caching with hash-based keys.
//!
//! Simulating a universe is the dominant cost of the system, and the result
//! is a pure function of (dataset, simulation parameters). This cache
//! memoizes `StockUniverse` snapshots as JSON files keyed by
//! `blake3(dataset_hash ‖ simulation config)`. Invalidation is key-based:
//! changing the dataset or any parameter produces a different key, so stale
//! entries are simply never read again. `clear()` is the explicit expiry
//! path. Unseeded runs are not cached — their output is not reproducible,
//! so a cached copy would misrepresent a fresh call.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use allocbench_core::{SimulationConfig, StockUniverse};

/// On-disk cache of simulated universes.
#[derive(Debug, Clone)]
pub struct MetricsCache {
    cache_dir: PathBuf,
}

impl MetricsCache {
    /// Create a cache rooted at `cache_dir`, creating the directory if
    /// needed.
    pub fn new(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&cache_dir).context("failed to create cache directory")?;
        Ok(Self { cache_dir })
    }

    /// Cache key for a (dataset, parameters) pair.
    pub fn key(dataset_hash: &str, config: &SimulationConfig) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(dataset_hash.as_bytes());
        let params =
            serde_json::to_string(config).expect("SimulationConfig serialization is infallible");
        hasher.update(params.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    /// Whether this run is cacheable at all (only seeded runs are).
    pub fn cacheable(config: &SimulationConfig) -> bool {
        config.seed.is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entry_path(key).exists()
    }

    /// Fetch a cached universe. Corrupt or unreadable entries read as a
    /// miss, not an error — the caller will recompute and overwrite.
    pub fn get(&self, key: &str) -> Option<StockUniverse> {
        let path = self.entry_path(key);
        let json = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&json).ok()
    }

    pub fn put(&self, key: &str, universe: &StockUniverse) -> Result<()> {
        let json = serde_json::to_string(universe).context("failed to serialize universe")?;
        std::fs::write(self.entry_path(key), json).context("failed to write cache entry")?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(path).context("failed to remove cache entry")?;
        }
        Ok(())
    }

    /// Delete every cached entry.
    pub fn clear(&self) -> Result<()> {
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let count = std::fs::read_dir(&self.cache_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.path().is_file()
                    && entry.path().extension().and_then(|s| s.to_str()) == Some("json")
            })
            .count();
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}.json"))
    }
}
