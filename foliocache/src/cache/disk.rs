//! Disk tier layout and blocking file operations.
//!
//! Each cache instance owns one flat directory named
//! `<prefix><instance name>` under the cache root; each key is one file in
//! that directory, named by [`entry_file_name`]. There is no index file, the
//! directory listing is the index.
//!
//! Everything here is blocking `std::fs` code. It is only ever called from
//! the instance's [`DiskQueue`](super::queue::DiskQueue), which moves it onto
//! Tokio's blocking pool.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::warn;

use super::traits::{CacheError, GcResult};

/// Default directory prefix for cache instances.
pub const DEFAULT_DIRECTORY_PREFIX: &str = "com.myportfolio.cache.";

/// Default disk retention: one week.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Platform cache root, falling back to the temp directory.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir().unwrap_or_else(std::env::temp_dir)
}

/// Directory for a named instance.
pub fn instance_directory(root: &Path, prefix: &str, name: &str) -> PathBuf {
    root.join(format!("{}{}", prefix, name))
}

/// File name for `key` inside the instance directory.
///
/// Keys are opaque strings. `%`, path separators and NUL are percent-encoded
/// and so is a leading `.`, so every key maps to one distinct plain file
/// name. The empty key maps to `%`, which no other key can produce.
pub fn entry_file_name(key: &str) -> String {
    if key.is_empty() {
        return "%".to_string();
    }

    let mut name = String::with_capacity(key.len());
    for (i, c) in key.chars().enumerate() {
        match c {
            '%' => name.push_str("%25"),
            '/' => name.push_str("%2F"),
            '\\' => name.push_str("%5C"),
            '\0' => name.push_str("%00"),
            '.' if i == 0 => name.push_str("%2E"),
            c => name.push(c),
        }
    }
    name
}

/// Check that `name` is usable as a single path component as is.
///
/// Used for names that appear verbatim on disk, such as settings store
/// names. Cache keys go through [`entry_file_name`] instead.
pub fn validate_key(name: &str) -> Result<(), CacheError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        Err(CacheError::InvalidKey(name.to_string()))
    } else {
        Ok(())
    }
}

/// Disk usage of an instance directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskUsage {
    pub files: u64,
    pub bytes: u64,
}

/// Write `bytes` to `path`, creating `directory` first if it is missing.
pub(crate) fn write_entry(directory: &Path, path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    if !directory.exists() {
        fs::create_dir_all(directory).map_err(|e| {
            warn!(path = %directory.display(), error = %e, "Failed to create cache directory");
            CacheError::Io(e)
        })?;
    }

    fs::write(path, bytes).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Failed to write cache entry");
        CacheError::Io(e)
    })
}

/// Read the file at `path`. Missing files are `None`; other errors are
/// logged and also reported as `None`.
pub(crate) fn read_entry(path: &Path) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read cache entry");
            None
        }
    }
}

pub(crate) fn entry_exists(path: &Path) -> bool {
    path.is_file()
}

/// Delete the file at `path`, returning whether it existed.
pub(crate) fn remove_entry(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to remove cache entry");
            false
        }
    }
}

/// A file in the instance directory.
struct EntryFile {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

fn list_entries(directory: &Path) -> io::Result<Vec<EntryFile>> {
    let read_dir = match fs::read_dir(directory) {
        Ok(rd) => rd,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        entries.push(EntryFile {
            path: entry.path(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        });
    }
    Ok(entries)
}

/// Count files and bytes in the instance directory.
pub(crate) fn usage(directory: &Path) -> Result<DiskUsage, CacheError> {
    let entries = list_entries(directory)?;
    Ok(DiskUsage {
        files: entries.len() as u64,
        bytes: entries.iter().map(|e| e.len).sum(),
    })
}

/// Remove every file in the instance directory.
pub(crate) fn clear_entries(directory: &Path) -> Result<GcResult, CacheError> {
    remove_matching(directory, |_| true)
}

/// Remove files last modified more than `max_age` ago.
pub(crate) fn sweep_entries(directory: &Path, max_age: Duration) -> Result<GcResult, CacheError> {
    let cutoff = SystemTime::now()
        .checked_sub(max_age)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    // Files without a readable mtime are kept
    remove_matching(directory, |entry| {
        entry.modified.map(|m| m < cutoff).unwrap_or(false)
    })
}

fn remove_matching<F>(directory: &Path, should_remove: F) -> Result<GcResult, CacheError>
where
    F: Fn(&EntryFile) -> bool,
{
    let start = std::time::Instant::now();
    let mut result = GcResult::default();

    for entry in list_entries(directory)? {
        if !should_remove(&entry) {
            continue;
        }
        match fs::remove_file(&entry.path) {
            Ok(()) => {
                result.entries_removed += 1;
                result.bytes_freed += entry.len;
            }
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "Failed to remove cache entry");
            }
        }
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    Ok(result)
}
