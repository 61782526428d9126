//! JSON-file backed settings store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{SettingsError, SettingsStore};
use crate::cache::validate_key;

type Entries = Map<String, Value>;

/// Settings stores kept as `<directory>/<name>.json`.
///
/// A single lock covers every store in the directory, so each
/// read-modify-write cycle is atomic with respect to other calls on the
/// same `FileSettingsStore`. Files are replaced by writing a temporary
/// sibling and renaming it.
pub struct FileSettingsStore {
    directory: PathBuf,
    lock: Mutex<()>,
}

impl FileSettingsStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File backing the store `name`.
    pub fn store_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.json", name))
    }

    /// Create an empty store if it does not exist yet.
    ///
    /// Returns `true` when the store was created, `false` when it already
    /// existed.
    pub fn create_store(&self, name: &str) -> Result<bool, SettingsError> {
        let path = self.checked_path(name)?;
        let _guard = self.lock.lock();

        if path.is_file() {
            return Ok(false);
        }

        fs::create_dir_all(&self.directory)
            .map_err(|e| SettingsError::FileNotWritten(e.to_string()))?;
        write_entries(&path, &Entries::new())?;
        debug!(store = name, path = %path.display(), "Created settings store");
        Ok(true)
    }

    /// Every key/value pair of the store.
    pub fn entries(&self, name: &str) -> Result<Entries, SettingsError> {
        let path = self.checked_path(name)?;
        let _guard = self.lock.lock();
        read_entries(&path)
    }

    fn checked_path(&self, name: &str) -> Result<PathBuf, SettingsError> {
        validate_key(name).map_err(|_| SettingsError::FileUnavailable)?;
        Ok(self.store_path(name))
    }

    /// Run `f` on the store's entries under the lock and persist the result.
    fn modify<F>(&self, name: &str, f: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut Entries) -> Result<(), SettingsError>,
    {
        let path = self.checked_path(name)?;
        let _guard = self.lock.lock();

        let mut entries = read_entries(&path)?;
        f(&mut entries)?;

        if !path.is_file() {
            return Err(SettingsError::FileDoesNotExist);
        }
        write_entries(&path, &entries)
    }
}

fn read_entries(path: &Path) -> Result<Entries, SettingsError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(SettingsError::FileUnavailable)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read settings file");
            return Err(SettingsError::FileUnavailable);
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Settings file is not a JSON object");
        SettingsError::FileUnavailable
    })
}

fn write_entries(path: &Path, entries: &Entries) -> Result<(), SettingsError> {
    let bytes = serde_json::to_vec_pretty(entries)
        .map_err(|e| SettingsError::FileNotWritten(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes)
        .and_then(|()| fs::rename(&tmp, path))
        .map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to write settings file");
            SettingsError::FileNotWritten(e.to_string())
        })
}

impl SettingsStore for FileSettingsStore {
    fn add_new(&self, store: &str, key: &str, value: Value) -> Result<(), SettingsError> {
        self.modify(store, |entries| {
            if entries.contains_key(key) {
                return Err(SettingsError::KeyAlreadyExists(key.to_string()));
            }
            entries.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn save(&self, store: &str, key: &str, value: Value) -> Result<(), SettingsError> {
        self.modify(store, |entries| {
            // Absent keys are left absent
            if let Some(slot) = entries.get_mut(key) {
                *slot = value;
            }
            Ok(())
        })
    }

    fn add_or_save(&self, store: &str, key: &str, value: Value) -> Result<(), SettingsError> {
        self.modify(store, |entries| {
            entries.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn remove_one(&self, store: &str, key: &str) -> Result<(), SettingsError> {
        self.modify(store, |entries| match entries.remove(key) {
            Some(_) => Ok(()),
            None => Err(SettingsError::KeyDoesNotExist(key.to_string())),
        })
    }

    fn remove_all(&self, store: &str) -> Result<(), SettingsError> {
        self.modify(store, |entries| {
            if entries.is_empty() {
                return Err(SettingsError::FileAlreadyEmpty);
            }
            entries.clear();
            Ok(())
        })
    }

    fn fetch(&self, store: &str, key: &str) -> Option<Value> {
        self.entries(store).ok()?.remove(key)
    }

    fn get(&self, store: &str, key: &str) -> Result<Value, SettingsError> {
        self.entries(store)?
            .remove(key)
            .ok_or_else(|| SettingsError::KeyDoesNotExist(key.to_string()))
    }

    fn key_exists(&self, store: &str, key: &str) -> bool {
        self.entries(store)
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store_with(name: &str) -> (TempDir, FileSettingsStore) {
        let temp = TempDir::new().unwrap();
        let store = FileSettingsStore::new(temp.path().join("settings"));
        store.create_store(name).unwrap();
        (temp, store)
    }

    #[test]
    fn test_create_store_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = FileSettingsStore::new(temp.path());

        assert!(store.create_store("Preferences").unwrap());
        store.add_new("Preferences", "a", json!(1)).unwrap();
        assert!(!store.create_store("Preferences").unwrap());

        // Existing content survives
        assert_eq!(store.fetch("Preferences", "a"), Some(json!(1)));
    }

    #[test]
    fn test_missing_store_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let store = FileSettingsStore::new(temp.path());

        assert_eq!(
            store.add_new("Nope", "a", json!(1)),
            Err(SettingsError::FileUnavailable)
        );
        assert_eq!(store.get("Nope", "a"), Err(SettingsError::FileUnavailable));
        assert_eq!(store.remove_all("Nope"), Err(SettingsError::FileUnavailable));
        assert_eq!(store.fetch("Nope", "a"), None);
        assert!(!store.key_exists("Nope", "a"));
    }

    #[test]
    fn test_invalid_store_name_is_unavailable() {
        let (_temp, store) = store_with("Preferences");
        assert_eq!(
            store.add_or_save("../escape", "a", json!(1)),
            Err(SettingsError::FileUnavailable)
        );
    }

    #[test]
    fn test_add_new_rejects_existing_key() {
        let (_temp, store) = store_with("Preferences");

        store.add_new("Preferences", "theme", json!("dark")).unwrap();
        assert_eq!(
            store.add_new("Preferences", "theme", json!("light")),
            Err(SettingsError::KeyAlreadyExists("theme".to_string()))
        );
        assert_eq!(store.get("Preferences", "theme"), Ok(json!("dark")));
    }

    #[test]
    fn test_save_only_overwrites_existing_key() {
        let (_temp, store) = store_with("Preferences");

        assert_eq!(store.save("Preferences", "theme", json!("dark")), Ok(()));
        assert!(!store.key_exists("Preferences", "theme"));

        store.add_new("Preferences", "theme", json!("dark")).unwrap();
        store.save("Preferences", "theme", json!("light")).unwrap();
        assert_eq!(store.fetch("Preferences", "theme"), Some(json!("light")));
    }

    #[test]
    fn test_add_or_save_upserts() {
        let (_temp, store) = store_with("Preferences");

        store.add_or_save("Preferences", "n", json!(1)).unwrap();
        store.add_or_save("Preferences", "n", json!(2)).unwrap();
        assert_eq!(store.get("Preferences", "n"), Ok(json!(2)));
    }

    #[test]
    fn test_remove_one_and_remove_all() {
        let (_temp, store) = store_with("Preferences");
        store.add_new("Preferences", "a", json!(1)).unwrap();
        store.add_new("Preferences", "b", json!(2)).unwrap();

        store.remove_one("Preferences", "a").unwrap();
        assert_eq!(
            store.remove_one("Preferences", "a"),
            Err(SettingsError::KeyDoesNotExist("a".to_string()))
        );

        store.remove_all("Preferences").unwrap();
        assert!(store.entries("Preferences").unwrap().is_empty());
        assert_eq!(
            store.remove_all("Preferences"),
            Err(SettingsError::FileAlreadyEmpty)
        );
    }

    #[test]
    fn test_get_missing_key() {
        let (_temp, store) = store_with("Preferences");
        assert_eq!(
            store.get("Preferences", "missing"),
            Err(SettingsError::KeyDoesNotExist("missing".to_string()))
        );
    }

    #[test]
    fn test_values_persist_across_instances() {
        let (temp, store) = store_with("Preferences");
        store
            .add_new("Preferences", "watchlist", json!(["TCS", "INFY"]))
            .unwrap();
        drop(store);

        let reopened = FileSettingsStore::new(temp.path().join("settings"));
        assert_eq!(
            reopened.get("Preferences", "watchlist"),
            Ok(json!(["TCS", "INFY"]))
        );
    }

    #[test]
    fn test_corrupt_file_is_unavailable() {
        let (_temp, store) = store_with("Preferences");
        fs::write(store.store_path("Preferences"), b"not json").unwrap();

        assert_eq!(
            store.get("Preferences", "a"),
            Err(SettingsError::FileUnavailable)
        );
    }

    #[test]
    fn test_concurrent_upserts_are_not_lost() {
        let (_temp, store) = store_with("Counters");
        let store = Arc::new(store);
        let mut handles = Vec::new();

        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store
                    .add_or_save("Counters", &format!("k{}", i), json!(i))
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.entries("Counters").unwrap().len(), 8);
    }
}
