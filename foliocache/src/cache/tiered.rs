//! Tiered memory + disk cache instance.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    TieredCache ("Default")                   │
//! │                                                              │
//! │  write ──► MemoryTier (sync, immediate)                      │
//! │        └─► DiskQueue ──► <root>/com.myportfolio.cache.Default/<key>
//! │                                                              │
//! │  read  ──► MemoryTier ──hit──► bytes                         │
//! │                │ miss                                        │
//! │                ▼                                             │
//! │            DiskQueue ──hit──► promote into MemoryTier        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The memory tier is not ordered relative to the disk queue: `write`
//! returns after the memory update and before the disk write is durable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::disk::{
    self, default_cache_root, entry_file_name, instance_directory, DEFAULT_DIRECTORY_PREFIX,
};
use super::memory::{MemoryTier, DEFAULT_MEMORY_CAPACITY};
use super::queue::{DiskQueue, QUEUE_LABEL_PREFIX};
use super::traits::{BoxFuture, CacheError, CacheStats, DiskWrite, GcResult, KeyedStore};

/// Configuration for one cache instance.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Instance name, appended to `prefix` to form the directory name.
    pub name: String,

    /// Root directory holding instance directories.
    pub root: PathBuf,

    /// Directory name prefix.
    pub prefix: String,

    /// Memory tier capacity in bytes.
    pub memory_capacity_bytes: u64,
}

impl CacheConfig {
    /// Create a config for `name` under the platform cache directory.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: default_cache_root(),
            prefix: DEFAULT_DIRECTORY_PREFIX.to_string(),
            memory_capacity_bytes: DEFAULT_MEMORY_CAPACITY,
        }
    }

    /// Set the cache root directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the instance directory prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the memory tier capacity.
    pub fn with_memory_capacity(mut self, bytes: u64) -> Self {
        self.memory_capacity_bytes = bytes;
        self
    }

    /// Directory this instance stores its files in.
    pub fn directory(&self) -> PathBuf {
        instance_directory(&self.root, &self.prefix, &self.name)
    }
}

/// A named cache instance with a memory tier and a disk tier.
///
/// Must be opened inside a Tokio runtime; the disk queue worker is spawned
/// on it. The directory itself is only created by the first disk write.
pub struct TieredCache {
    name: String,
    directory: PathBuf,
    memory: MemoryTier,
    queue: DiskQueue,
}

impl TieredCache {
    /// Open the instance described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NoRuntime` outside a Tokio runtime.
    pub fn open(config: CacheConfig) -> Result<Self, CacheError> {
        let directory = config.directory();
        let queue = DiskQueue::start(format!("{}{}", QUEUE_LABEL_PREFIX, config.name))?;

        debug!(
            cache = %config.name,
            directory = %directory.display(),
            memory_capacity = config.memory_capacity_bytes,
            "Opened cache instance"
        );

        Ok(Self {
            name: config.name,
            directory,
            memory: MemoryTier::new(config.memory_capacity_bytes),
            queue,
        })
    }

    /// Instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Wait for every disk operation queued before this call.
    ///
    /// Production callers never need this; it exists for tests and for
    /// draining writes on shutdown.
    pub async fn flush(&self) {
        self.queue.flush().await;
    }

    /// Remove `key` from both tiers. Returns whether either tier held it.
    pub async fn remove(&self, key: &str) -> bool {
        let in_memory = self.memory.remove(key);
        let path = self.path(key);
        let on_disk = self
            .queue
            .run("remove", move || disk::remove_entry(&path))
            .await
            .unwrap_or_else(|e| {
                warn!(cache = %self.name, key, error = %e, "Disk remove failed");
                false
            });
        in_memory || on_disk
    }

    /// Empty the memory tier and delete every file of this instance.
    pub async fn clear(&self) -> Result<GcResult, CacheError> {
        self.memory.clear();
        let directory = self.directory.clone();
        let result = self
            .queue
            .run("clear", move || disk::clear_entries(&directory))
            .await??;
        debug!(cache = %self.name, %result, "Cleared cache instance");
        Ok(result)
    }

    /// Delete disk entries last written more than `max_age` ago.
    ///
    /// The memory tier is left alone; entries it holds stay readable for
    /// the rest of the process.
    pub async fn sweep_expired(&self, max_age: Duration) -> Result<GcResult, CacheError> {
        let directory = self.directory.clone();
        let result = self
            .queue
            .run("sweep", move || disk::sweep_entries(&directory, max_age))
            .await??;
        debug!(cache = %self.name, max_age_secs = max_age.as_secs(), %result, "Swept expired entries");
        Ok(result)
    }

    /// Snapshot of both tiers.
    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let directory = self.directory.clone();
        let usage = self.queue.run("stats", move || disk::usage(&directory)).await??;

        Ok(CacheStats {
            memory_entries: self.memory.entry_count(),
            memory_bytes: self.memory.size_bytes(),
            memory_hits: self.memory.hits(),
            memory_misses: self.memory.misses(),
            disk_files: usage.files,
            disk_bytes: usage.bytes,
        })
    }

    async fn load_from_disk(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.path(key);
        self.queue
            .run("read", move || disk::read_entry(&path))
            .await
            .unwrap_or_else(|e| {
                warn!(cache = %self.name, key, error = %e, "Disk read failed");
                None
            })
    }
}

impl KeyedStore for TieredCache {
    fn write_memory(&self, key: &str, bytes: Vec<u8>) {
        self.memory.insert(key, bytes);
    }

    fn write_disk(&self, key: &str, bytes: Vec<u8>) -> DiskWrite {
        let directory = self.directory.clone();
        let path = self.path(key);
        let submitted = self.queue.submit("write", move || {
            let len = bytes.len();
            let result = disk::write_entry(&directory, &path, &bytes);
            if result.is_ok() {
                trace!(path = %path.display(), bytes = len, "Wrote cache entry");
            }
            result
        });

        match submitted {
            Ok(rx) => DiskWrite::pending(rx),
            Err(e) => {
                warn!(cache = %self.name, key, error = %e, "Dropping disk write");
                DiskWrite::completed(Err(e))
            }
        }
    }

    fn write(&self, key: &str, bytes: Vec<u8>) -> DiskWrite {
        self.write_memory(key, bytes.clone());
        self.write_disk(key, bytes)
    }

    fn read(&self, key: &str) -> BoxFuture<'_, Option<Vec<u8>>> {
        let key = key.to_string();
        Box::pin(async move {
            if let Some(bytes) = self.memory.get(&key) {
                trace!(cache = %self.name, key = %key, "Memory hit");
                return Some(bytes);
            }

            let bytes = self.load_from_disk(&key).await?;
            debug!(cache = %self.name, key = %key, "Disk hit, promoting to memory");
            // A write that landed while the disk read was queued is newer
            Some(self.memory.insert_if_absent(&key, bytes))
        })
    }

    fn read_disk(&self, key: &str) -> BoxFuture<'_, Option<Vec<u8>>> {
        let key = key.to_string();
        Box::pin(async move { self.load_from_disk(&key).await })
    }

    fn has(&self, key: &str) -> BoxFuture<'_, bool> {
        let key = key.to_string();
        Box::pin(async move { self.has_memory(&key) || self.has_disk(&key).await })
    }

    fn has_memory(&self, key: &str) -> bool {
        self.memory.contains(key)
    }

    fn has_disk(&self, key: &str) -> BoxFuture<'_, bool> {
        let key = key.to_string();
        Box::pin(async move {
            let path = self.path(&key);
            self.queue
                .run("exists", move || disk::entry_exists(&path))
                .await
                .unwrap_or(false)
        })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.directory.join(entry_file_name(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tempfile::TempDir;

    fn open(temp: &TempDir) -> TieredCache {
        TieredCache::open(CacheConfig::new("Default").with_root(temp.path())).unwrap()
    }

    #[tokio::test]
    async fn test_write_then_read_from_memory_immediately() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        let _ = cache.write("Portfolio", vec![1, 2, 3]);

        assert!(cache.has_memory("Portfolio"));
        assert_eq!(cache.read("Portfolio").await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_write_reaches_disk_after_flush() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        let _ = cache.write("Portfolio", vec![9; 32]);
        cache.flush().await;

        assert!(cache.has_disk("Portfolio").await);
        assert_eq!(
            std::fs::read(cache.path("Portfolio")).unwrap(),
            vec![9; 32]
        );
    }

    #[tokio::test]
    async fn test_directory_created_lazily() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        assert!(!cache.directory().exists());
        cache.write_memory("k", vec![1]);
        cache.flush().await;
        assert!(!cache.directory().exists());

        cache.write_disk("k", vec![1]).wait().await.unwrap();
        assert!(cache.directory().exists());
    }

    #[tokio::test]
    async fn test_path_is_instance_directory_joined_with_key() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        assert_eq!(
            cache.path("Portfolio"),
            temp.path().join("com.myportfolio.cache.Default").join("Portfolio")
        );
        assert_eq!(
            cache.path("holdings/v2"),
            temp.path().join("com.myportfolio.cache.Default").join("holdings%2Fv2")
        );
    }

    #[tokio::test]
    async fn test_read_disk_does_not_promote() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        cache.write_disk("k", vec![5]).wait().await.unwrap();

        assert_eq!(cache.read_disk("k").await, Some(vec![5]));
        assert!(!cache.has_memory("k"));
    }

    #[tokio::test]
    async fn test_has_does_not_promote() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        cache.write_disk("k", vec![5]).wait().await.unwrap();

        assert!(cache.has("k").await);
        assert!(!cache.has_memory("k"));
    }

    #[tokio::test]
    async fn test_read_missing_key_is_none() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        assert_eq!(cache.read("absent").await, None);
        assert!(!cache.has("absent").await);
    }

    #[tokio::test]
    async fn test_disk_read_sees_preceding_write_without_flush() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        let _ = cache.write_disk("k", vec![7, 7]);

        // Same queue, so the read runs after the write
        assert_eq!(cache.read_disk("k").await, Some(vec![7, 7]));
    }

    #[tokio::test]
    async fn test_keys_with_path_characters_stay_in_instance_directory() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        for key in ["holdings/v2", "../escape", "..", "a\\b"] {
            cache.write(key, key.as_bytes().to_vec()).wait().await.unwrap();

            assert_eq!(cache.path(key).parent(), Some(cache.directory()));
            assert!(cache.has_memory(key));
            assert!(cache.has_disk(key).await);
            assert_eq!(cache.read_disk(key).await, Some(key.as_bytes().to_vec()));
        }

        assert!(!temp.path().join("escape").exists());
        assert_eq!(cache.stats().await.unwrap().disk_files, 4);
    }

    #[tokio::test]
    async fn test_promotion_keeps_write_made_during_disk_read() {
        let temp = TempDir::new().unwrap();
        let cache = Arc::new(open(&temp));
        cache.write_disk("k", b"v1".to_vec()).wait().await.unwrap();

        // Hold the queue so the read below stays pending
        let (release, held) = std::sync::mpsc::channel::<()>();
        drop(cache.queue.submit("hold", move || {
            let _ = held.recv();
        }));

        let reader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.read("k").await })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let _ = cache.write("k", b"v2".to_vec());
        release.send(()).unwrap();

        assert_eq!(reader.await.unwrap(), Some(b"v2".to_vec()));
        cache.flush().await;
        assert_eq!(cache.memory.get("k"), Some(b"v2".to_vec()));
        assert_eq!(cache.read_disk("k").await, Some(b"v2".to_vec()));
    }

    #[tokio::test]
    async fn test_disk_write_failure_is_reported_on_handle_only() {
        let temp = TempDir::new().unwrap();
        // Root is a regular file, so creating the instance directory fails
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let cache = TieredCache::open(CacheConfig::new("Default").with_root(&blocker)).unwrap();

        let handle = cache.write("k", vec![1]);

        // Memory side is unaffected
        assert_eq!(cache.read("k").await, Some(vec![1]));
        assert!(matches!(handle.wait().await, Err(CacheError::Io(_))));
        assert!(!cache.has_disk("k").await);
    }

    #[tokio::test]
    async fn test_remove_clears_both_tiers() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        cache.write("k", vec![1]).wait().await.unwrap();

        assert!(cache.remove("k").await);
        assert!(!cache.has("k").await);
        assert!(!cache.remove("k").await);
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let temp = TempDir::new().unwrap();
        let cache = open(&temp);

        let _ = cache.write("a", vec![0; 100]);
        let _ = cache.write("b", vec![0; 50]);

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.disk_files, 2);
        assert_eq!(stats.disk_bytes, 150);
        assert_eq!(stats.memory_entries, 2);

        let result = cache.clear().await.unwrap();
        assert_eq!(result.entries_removed, 2);
        assert_eq!(result.bytes_freed, 150);

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.disk_files, 0);
        assert_eq!(stats.memory_entries, 0);
    }

    #[tokio::test]
    async fn test_instances_are_isolated() {
        let temp = TempDir::new().unwrap();
        let default = open(&temp);
        let other = TieredCache::open(CacheConfig::new("Other").with_root(temp.path())).unwrap();

        default.write("Portfolio", vec![1]).wait().await.unwrap();

        assert!(!other.has("Portfolio").await);
        assert_ne!(default.path("Portfolio"), other.path("Portfolio"));
    }

    #[tokio::test]
    async fn test_reopened_instance_reads_persisted_entry() {
        let temp = TempDir::new().unwrap();
        {
            let cache = open(&temp);
            cache.write("Portfolio", b"persisted".to_vec()).wait().await.unwrap();
        }

        let cache = open(&temp);
        assert!(!cache.has_memory("Portfolio"));
        assert_eq!(cache.read("Portfolio").await, Some(b"persisted".to_vec()));
        assert!(cache.has_memory("Portfolio"));
    }
}
