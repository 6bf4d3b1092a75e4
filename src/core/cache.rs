//! Bounded extraction cache keyed by normalized text.
//!
//! Deduplicates extractor calls: the same normalized text is handed to the
//! language model at most once per cache generation. Eviction is
//! deliberately crude: once an insert pushes the map past its ceiling the
//! whole cache is cleared, triggering entry included. Duplicate work after
//! a clear is tolerated; this is a latency optimization, not a correctness
//! mechanism.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::core::order::ExtractionFragment;

/// Default entry ceiling before the cache is wiped.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Hit/miss counters, diagnostic only.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    clears: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn clears(&self) -> u64 {
        self.clears.load(Ordering::Relaxed)
    }
}

/// Concurrent map of normalized text to previously extracted fragments.
///
/// Safe for get/put from any number of sessions; no ordering guarantee
/// between racing puts for the same key.
pub struct ExtractionCache {
    entries: RwLock<HashMap<String, ExtractionFragment>>,
    capacity: usize,
    stats: CacheStats,
}

impl ExtractionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
            stats: CacheStats::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<ExtractionFragment> {
        let hit = self.entries.read().get(key).cloned();
        match &hit {
            Some(_) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!("extraction cache hit: {}", key);
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
            }
        }
        hit
    }

    /// Insert a fragment, then wipe everything if the insert crossed the
    /// ceiling.
    pub fn put(&self, key: String, fragment: ExtractionFragment) {
        let mut entries = self.entries.write();
        entries.insert(key, fragment);
        if entries.len() > self.capacity {
            info!(
                "extraction cache exceeded {} entries, clearing",
                self.capacity
            );
            entries.clear();
            self.stats.clears.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Default for ExtractionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
