//! Memory tier with size-bounded eviction using moka.
//!
//! The tier is a `moka::sync::Cache` weighted by payload length. moka is
//! internally synchronized, so concurrent `resolve` calls can read and write
//! the same instance without caller-side locking, and the calls complete on
//! the caller's task without awaiting.
//!
//! Entries live for the process lifetime or until capacity eviction. They
//! are never persisted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::sync::Cache;

/// Default memory tier capacity: 64 MiB.
pub const DEFAULT_MEMORY_CAPACITY: u64 = 64 * 1024 * 1024;

/// In-memory tier for one cache instance.
pub struct MemoryTier {
    /// The underlying moka cache
    cache: Cache<String, Arc<Vec<u8>>>,
    /// Maximum size in bytes
    max_size_bytes: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryTier {
    /// Create a memory tier holding at most `max_size_bytes` of payload.
    pub fn new(max_size_bytes: u64) -> Self {
        let cache = Cache::builder()
            // moka weights are u32, cap very large entries
            .weigher(|_key: &String, value: &Arc<Vec<u8>>| -> u32 {
                value.len().min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes)
            .build();

        Self {
            cache,
            max_size_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get a copy of the bytes stored under `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.cache.get(key) {
            Some(data) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some((*data).clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or replace the entry for `key`.
    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.cache.insert(key.to_string(), Arc::new(data));
    }

    /// Insert `data` only if `key` has no entry, returning whichever value
    /// the tier holds afterwards.
    ///
    /// The check and the insert are one atomic step, so a concurrent
    /// `insert` is never overwritten.
    pub fn insert_if_absent(&self, key: &str, data: Vec<u8>) -> Vec<u8> {
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(data));
        (*entry.into_value()).clone()
    }

    /// Check if a key exists. Does not count as a hit or miss.
    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Remove `key`, returning whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.cache.remove(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
    }

    /// Number of entries, after running pending maintenance.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Weighted size in bytes, after running pending maintenance.
    pub fn size_bytes(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.weighted_size()
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }
}
