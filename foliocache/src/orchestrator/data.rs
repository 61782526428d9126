//! The data orchestrator.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{
    DataRequest, DecodeFailurePolicy, Execution, OrchestratorError, Resolution, StoreAction,
    StoreCommand, StoreKind,
};
use crate::cache::KeyedStore;
use crate::codec::JsonCodec;
use crate::fetch::{FetchDescriptor, FetchError, RemoteFetcher};
use crate::settings::SettingsStore;

/// Serves typed data from a keyed store, falling back to a remote fetch.
///
/// Collaborators are injected; the orchestrator holds no other state, so
/// one instance may serve any number of concurrent calls.
///
/// # Example
///
/// ```ignore
/// let orchestrator = DataOrchestrator::new(Arc::new(cache))
///     .with_fetcher(Arc::new(fetcher));
///
/// match orchestrator.resolve::<Holdings>(&descriptor, "Portfolio").await {
///     Resolution::Done(holdings) => render(holdings),
///     Resolution::Failed(error) => report(error),
///     Resolution::Empty => {}
/// }
/// ```
pub struct DataOrchestrator {
    store: Arc<dyn KeyedStore>,
    fetcher: Option<Arc<dyn RemoteFetcher>>,
    settings: Option<Arc<dyn SettingsStore>>,
    codec: JsonCodec,
    decode_policy: DecodeFailurePolicy,
}

impl DataOrchestrator {
    /// Create an orchestrator over `store` with no fetcher and no settings
    /// store.
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self {
            store,
            fetcher: None,
            settings: None,
            codec: JsonCodec::new(),
            decode_policy: DecodeFailurePolicy::default(),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_decode_policy(mut self, policy: DecodeFailurePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    pub fn store(&self) -> &Arc<dyn KeyedStore> {
        &self.store
    }

    pub fn decode_policy(&self) -> DecodeFailurePolicy {
        self.decode_policy
    }

    /// Resolve `cache_key` to a `T`, fetching with `descriptor` on a miss.
    ///
    /// # Arguments
    ///
    /// * `descriptor` - Remote request used only when the store has no entry
    /// * `cache_key` - Key in the injected store
    ///
    /// # Returns
    ///
    /// - `Done` with the cached or fetched value
    /// - `Failed` with the fetcher's error, unchanged; the store is untouched
    /// - `Empty` when a cached entry could not be read or decoded under
    ///   [`DecodeFailurePolicy::ReturnEmpty`]
    ///
    /// Dropping the returned future before the fetch completes leaves the
    /// store untouched.
    pub async fn resolve<T>(&self, descriptor: &FetchDescriptor, cache_key: &str) -> Resolution<T>
    where
        T: Serialize + DeserializeOwned,
    {
        if self.store.has(cache_key).await {
            match self.read_cached(cache_key).await {
                Some(value) => {
                    debug!(key = cache_key, "Cache hit");
                    return Resolution::Done(value);
                }
                None if self.decode_policy == DecodeFailurePolicy::ReturnEmpty => {
                    return Resolution::Empty;
                }
                None => {
                    debug!(key = cache_key, "Unusable cache entry, fetching remote");
                }
            }
        } else {
            debug!(key = cache_key, "Cache miss, fetching remote");
        }

        let Some(fetcher) = self.fetcher.as_ref() else {
            warn!(key = cache_key, "No remote fetcher configured");
            return Resolution::Failed(FetchError::Unknown);
        };

        let bytes = match fetcher.fetch(descriptor).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(key = cache_key, error = %e, "Remote fetch failed");
                return Resolution::Failed(e);
            }
        };

        let value: T = match self.codec.decode(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = cache_key, error = %e, "Remote response did not decode");
                return Resolution::Failed(FetchError::MalformedResponse);
            }
        };

        self.populate(cache_key, &value);
        Resolution::Done(value)
    }

    /// Read and decode the cached entry, logging why it is unusable.
    async fn read_cached<T: DeserializeOwned>(&self, cache_key: &str) -> Option<T> {
        let Some(bytes) = self.store.read(cache_key).await else {
            warn!(key = cache_key, "Cache entry disappeared before it could be read");
            return None;
        };

        match self.codec.decode(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = cache_key, error = %e, "Cached entry did not decode");
                None
            }
        }
    }

    /// Write `value` back to both tiers. The disk write is not awaited.
    fn populate<T: Serialize>(&self, cache_key: &str, value: &T) {
        match self.codec.encode(value) {
            Ok(bytes) => {
                debug!(key = cache_key, bytes = bytes.len(), "Populating cache");
                drop(self.store.write(cache_key, bytes));
            }
            Err(e) => {
                warn!(key = cache_key, error = %e, "Fetched value did not encode, not cached");
            }
        }
    }

    /// Dispatch a request to the cache-first path or a persistent store.
    pub async fn execute<T>(&self, request: DataRequest) -> Result<Execution<T>, OrchestratorError>
    where
        T: Serialize + DeserializeOwned,
    {
        match request {
            DataRequest::Api {
                descriptor,
                cache_key,
            } => Ok(Execution::Resolved(
                self.resolve(&descriptor, &cache_key).await,
            )),
            DataRequest::Persistent(StoreKind::Settings(command)) => {
                self.apply_store_command(&command).map(Execution::Stored)
            }
            DataRequest::Persistent(kind) => Err(OrchestratorError::UnsupportedStore(kind.name())),
        }
    }

    /// Apply a settings command.
    ///
    /// Returns the value for `Fetch` and `Get`, `None` for every other action.
    pub fn apply_store_command(
        &self,
        command: &StoreCommand,
    ) -> Result<Option<Value>, OrchestratorError> {
        let settings = self
            .settings
            .as_ref()
            .ok_or(OrchestratorError::NoSettingsStore)?;

        let store = command.store.as_str();
        let key = command.key.as_str();

        let value = || {
            command
                .value
                .clone()
                .ok_or(OrchestratorError::MissingValue(command.action))
        };

        debug!(store, key, action = %command.action, "Applying store command");

        match command.action {
            StoreAction::AddNew => settings.add_new(store, key, value()?)?,
            StoreAction::Save => settings.save(store, key, value()?)?,
            StoreAction::AddOrSave => settings.add_or_save(store, key, value()?)?,
            StoreAction::RemoveOne => settings.remove_one(store, key)?,
            StoreAction::RemoveAll => settings.remove_all(store)?,
            StoreAction::Fetch => return Ok(settings.fetch(store, key)),
            StoreAction::Get => return Ok(Some(settings.get(store, key)?)),
        }
        Ok(None)
    }
}
