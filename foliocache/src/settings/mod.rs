//! Named key/value stores for persisted settings.
//!
//! A store is a flat JSON object on disk, identified by name. The
//! [`SettingsStore`] trait is what the orchestrator dispatches
//! `StoreKind::Settings` commands to; [`FileSettingsStore`] keeps each
//! store as `<directory>/<name>.json`.
//!
//! # Example
//!
//! ```ignore
//! use foliocache::settings::{FileSettingsStore, SettingsStore};
//! use serde_json::json;
//!
//! let store = FileSettingsStore::new("/var/lib/foliocache/settings");
//! store.create_store("Preferences")?;
//! store.add_new("Preferences", "currency", json!("INR"))?;
//! assert_eq!(store.fetch("Preferences", "currency"), Some(json!("INR")));
//! ```

mod error;
mod file;

pub use error::SettingsError;
pub use file::FileSettingsStore;

use serde_json::Value;

/// Key/value operations over named stores.
///
/// Every call names the store it targets. Operations on a store that has
/// not been created fail with [`SettingsError::FileUnavailable`], except
/// [`fetch`](SettingsStore::fetch) and [`key_exists`](SettingsStore::key_exists)
/// which report absence.
pub trait SettingsStore: Send + Sync {
    /// Insert `key`. Fails with `KeyAlreadyExists` if it is present.
    fn add_new(&self, store: &str, key: &str, value: Value) -> Result<(), SettingsError>;

    /// Overwrite `key` if it is present. An absent key is left absent and
    /// the call still succeeds.
    fn save(&self, store: &str, key: &str, value: Value) -> Result<(), SettingsError>;

    /// Insert or overwrite `key`.
    fn add_or_save(&self, store: &str, key: &str, value: Value) -> Result<(), SettingsError>;

    /// Remove `key`. Fails with `KeyDoesNotExist` if it is absent.
    fn remove_one(&self, store: &str, key: &str) -> Result<(), SettingsError>;

    /// Remove every key. Fails with `FileAlreadyEmpty` on an empty store.
    fn remove_all(&self, store: &str) -> Result<(), SettingsError>;

    /// Value for `key`, or `None` for any failure.
    fn fetch(&self, store: &str, key: &str) -> Option<Value>;

    /// Value for `key`.
    fn get(&self, store: &str, key: &str) -> Result<Value, SettingsError>;

    fn key_exists(&self, store: &str, key: &str) -> bool;
}
