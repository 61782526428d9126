//! Orchestrator request, outcome and error types.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

use crate::fetch::{FetchDescriptor, FetchError};
use crate::settings::SettingsError;

/// Terminal state of one `resolve` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// A value, from the cache or freshly fetched.
    Done(T),
    /// The remote fetch failed; the error is passed through unchanged.
    Failed(FetchError),
    /// Completed with no value and no error.
    Empty,
}

impl<T> Resolution<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Resolution::Done(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Resolution::Empty)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Resolution::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Resolution::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Resolution::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// What to do when a cached entry exists but does not decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeFailurePolicy {
    /// Complete with [`Resolution::Empty`] and leave the entry in place.
    #[default]
    ReturnEmpty,
    /// Treat the entry as a miss; a successful fetch overwrites it.
    FetchRemote,
}

impl DecodeFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeFailurePolicy::ReturnEmpty => "empty",
            DecodeFailurePolicy::FetchRemote => "fetch",
        }
    }
}

impl fmt::Display for DecodeFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecodeFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" | "return_empty" => Ok(DecodeFailurePolicy::ReturnEmpty),
            "fetch" | "fetch_remote" => Ok(DecodeFailurePolicy::FetchRemote),
            other => Err(format!(
                "unknown decode failure policy '{}' (expected 'empty' or 'fetch')",
                other
            )),
        }
    }
}

/// One request to [`DataOrchestrator::execute`](super::DataOrchestrator::execute).
#[derive(Debug, Clone)]
pub enum DataRequest {
    /// Cache-first remote request.
    Api {
        descriptor: FetchDescriptor,
        cache_key: String,
    },
    /// Command for a persistent store.
    Persistent(StoreKind),
}

/// Persistent store backends a request can target.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreKind {
    Settings(StoreCommand),
    Keychain,
    Sqlite,
    Document,
    ObjectGraph,
}

impl StoreKind {
    pub fn name(&self) -> &'static str {
        match self {
            StoreKind::Settings(_) => "settings",
            StoreKind::Keychain => "keychain",
            StoreKind::Sqlite => "sqlite",
            StoreKind::Document => "document",
            StoreKind::ObjectGraph => "object-graph",
        }
    }
}

/// Settings store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    AddNew,
    Save,
    AddOrSave,
    Fetch,
    Get,
    RemoveOne,
    RemoveAll,
}

impl StoreAction {
    /// Whether the action writes a value and so needs one.
    pub fn needs_value(&self) -> bool {
        matches!(
            self,
            StoreAction::AddNew | StoreAction::Save | StoreAction::AddOrSave
        )
    }
}

impl fmt::Display for StoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreAction::AddNew => "add-new",
            StoreAction::Save => "save",
            StoreAction::AddOrSave => "add-or-save",
            StoreAction::Fetch => "fetch",
            StoreAction::Get => "get",
            StoreAction::RemoveOne => "remove-one",
            StoreAction::RemoveAll => "remove-all",
        };
        f.write_str(name)
    }
}

/// A settings store command.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCommand {
    /// Store name.
    pub store: String,
    pub action: StoreAction,
    /// Ignored by `RemoveAll`.
    pub key: String,
    /// Required by `AddNew`, `Save` and `AddOrSave`.
    pub value: Option<Value>,
}

impl StoreCommand {
    pub fn new(store: impl Into<String>, action: StoreAction, key: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            action,
            key: key.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

/// Outcome of [`DataOrchestrator::execute`](super::DataOrchestrator::execute).
#[derive(Debug, Clone, PartialEq)]
pub enum Execution<T> {
    /// Result of an API request.
    Resolved(Resolution<T>),
    /// Result of a store command: the value for `Fetch`/`Get`, `None` otherwise.
    Stored(Option<Value>),
}

/// Errors from persistent-store dispatch.
///
/// API requests never produce these; their failures are part of
/// [`Resolution`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// The targeted backend has no implementation.
    #[error("Persistent store '{0}' is not supported")]
    UnsupportedStore(&'static str),

    #[error("No settings store configured")]
    NoSettingsStore,

    /// A writing action was sent without a value.
    #[error("Store action '{0}' requires a value")]
    MissingValue(StoreAction),

    #[error("Settings store error: {0}")]
    Settings(#[from] SettingsError),
}
