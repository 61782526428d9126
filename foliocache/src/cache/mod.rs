//! Two-tier keyed cache.
//!
//! A cache instance pairs a size-bounded memory tier with a directory of
//! plain files, both addressed by the same string key. Reads go memory
//! first and promote disk hits; writes update memory synchronously and
//! queue the disk write on the instance's serial [`DiskQueue`].
//!
//! # Modules
//!
//! - [`traits`]: the [`KeyedStore`] trait and shared types
//! - [`memory`]: moka-backed memory tier
//! - [`disk`]: directory layout and blocking file operations
//! - [`queue`]: per-instance FIFO disk worker
//! - [`tiered`]: [`TieredCache`], the concrete store

pub mod disk;
pub mod memory;
pub mod queue;
pub mod tiered;
pub mod traits;

pub use disk::{
    default_cache_root, entry_file_name, instance_directory, validate_key, DiskUsage,
    DEFAULT_DIRECTORY_PREFIX, DEFAULT_RETENTION,
};
pub use memory::{MemoryTier, DEFAULT_MEMORY_CAPACITY};
pub use queue::DiskQueue;
pub use tiered::{CacheConfig, TieredCache};
pub use traits::{BoxFuture, CacheError, CacheStats, DiskWrite, GcResult, KeyedStore};
