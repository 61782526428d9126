//! Core traits for the keyed cache.
//!
//! The `KeyedStore` trait is the only surface the orchestrator sees. It knows
//! nothing about what the stored bytes mean; serialization happens one layer
//! up in [`crate::codec`].
//!
//! # Design Principles
//!
//! - **String keys**: one key addresses both the memory and the disk tier
//! - **Vec<u8> values**: raw bytes, no serialization opinions imposed
//! - **Fire-and-forget disk writes**: `write_disk` returns a [`DiskWrite`]
//!   handle that production callers drop and tests await
//! - **Dyn-compatible**: async methods return `Pin<Box<dyn Future>>` so the
//!   orchestrator can hold an `Arc<dyn KeyedStore>`
//!
//! # Example
//!
//! ```ignore
//! use foliocache::cache::{CacheConfig, KeyedStore, TieredCache};
//!
//! let cache = TieredCache::open(CacheConfig::new("Default"))?;
//! cache.write("Portfolio", b"{}".to_vec());
//! assert_eq!(cache.read("Portfolio").await, Some(b"{}".to_vec()));
//! ```

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;
use tokio::sync::oneshot;

/// Result of a disk sweep (clear or retention expiry).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcResult {
    /// Number of entries removed.
    pub entries_removed: usize,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Duration of the operation in milliseconds.
    pub duration_ms: u64,
}

impl fmt::Display for GcResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GC: removed {} entries, freed {} bytes in {}ms",
            self.entries_removed, self.bytes_freed, self.duration_ms
        )
    }
}

/// Point-in-time statistics for one cache instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently held by the memory tier.
    pub memory_entries: u64,
    /// Weighted size of the memory tier in bytes.
    pub memory_bytes: u64,
    /// Memory tier hits since the instance was opened.
    pub memory_hits: u64,
    /// Memory tier misses since the instance was opened.
    pub memory_misses: u64,
    /// Files in the instance directory.
    pub disk_files: u64,
    /// Total size of those files in bytes.
    pub disk_bytes: u64,
}

/// Errors that can occur during cache operations.
///
/// None of these reach the caller of [`KeyedStore::write`]; they are only
/// observable through a [`DiskWrite`] handle or the maintenance operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error during a disk operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The name cannot be used as a single file name.
    #[error("Invalid name: {0:?}")]
    InvalidKey(String),

    /// The disk queue worker is gone (runtime shutting down).
    #[error("Disk queue is closed")]
    QueueClosed,

    /// No Tokio runtime was available to host the disk queue.
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Completion handle for a queued disk write.
///
/// Dropping the handle does not cancel the write. Awaiting [`DiskWrite::wait`]
/// resolves once the write has run on the instance's disk queue.
#[must_use = "drop the handle explicitly if the write is fire-and-forget"]
pub struct DiskWrite {
    state: DiskWriteState,
}

enum DiskWriteState {
    Pending(oneshot::Receiver<Result<(), CacheError>>),
    Ready(Result<(), CacheError>),
}

impl DiskWrite {
    pub(crate) fn pending(rx: oneshot::Receiver<Result<(), CacheError>>) -> Self {
        Self {
            state: DiskWriteState::Pending(rx),
        }
    }

    /// A handle whose outcome is already known.
    ///
    /// Used by stores that persist synchronously, and for writes rejected
    /// before they reach the queue.
    pub fn completed(result: Result<(), CacheError>) -> Self {
        Self {
            state: DiskWriteState::Ready(result),
        }
    }

    /// Wait for the write to finish and return its outcome.
    pub async fn wait(self) -> Result<(), CacheError> {
        match self.state {
            DiskWriteState::Ready(result) => result,
            DiskWriteState::Pending(rx) => rx.await.unwrap_or(Err(CacheError::QueueClosed)),
        }
    }
}

impl fmt::Debug for DiskWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            DiskWriteState::Pending(_) => "pending",
            DiskWriteState::Ready(Ok(())) => "ok",
            DiskWriteState::Ready(Err(_)) => "failed",
        };
        f.debug_struct("DiskWrite").field("state", &state).finish()
    }
}

/// Tiered key/value store over a memory tier and a disk tier.
///
/// # Ordering
///
/// Memory operations take effect immediately on the calling task. Disk
/// operations run on a per-instance FIFO queue, so a disk write submitted
/// before a disk read is visible to that read. `write` returns after the
/// memory update but before the disk update is durable.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`; the memory tier must tolerate
/// concurrent readers and writers without caller-side locking.
pub trait KeyedStore: Send + Sync {
    /// Overwrite the memory-tier entry for `key`.
    ///
    /// Capacity eviction is silent.
    fn write_memory(&self, key: &str, bytes: Vec<u8>);

    /// Queue a write of `bytes` to the disk location for `key`.
    ///
    /// Never blocks and never fails the caller. Failures are logged.
    fn write_disk(&self, key: &str, bytes: Vec<u8>) -> DiskWrite;

    /// `write_memory` followed by `write_disk`.
    fn write(&self, key: &str, bytes: Vec<u8>) -> DiskWrite;

    /// Read `key`, memory first, then disk.
    ///
    /// A disk hit is promoted into the memory tier before returning.
    fn read(&self, key: &str) -> BoxFuture<'_, Option<Vec<u8>>>;

    /// Read `key` from the disk tier only, without promotion.
    fn read_disk(&self, key: &str) -> BoxFuture<'_, Option<Vec<u8>>>;

    /// True if either tier holds `key`. No promotion.
    fn has(&self, key: &str) -> BoxFuture<'_, bool>;

    /// True if the memory tier holds `key`.
    fn has_memory(&self, key: &str) -> bool;

    /// True if the disk tier holds `key`.
    fn has_disk(&self, key: &str) -> BoxFuture<'_, bool>;

    /// Disk location for `key`. Pure, no I/O.
    fn path(&self, key: &str) -> PathBuf;
}
