//! Request descriptors, the fetch error taxonomy, and the fetcher trait.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::cache::BoxFuture;

/// HTTP methods supported by descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Mutating methods carry parameters in the body; the others in the
    /// query string.
    pub fn is_mutating(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to perform one remote fetch.
///
/// Built per call and never mutated afterwards; the builder methods consume
/// and return the descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchDescriptor {
    pub method: HttpMethod,
    /// Scheme and host, e.g. `https://run.mocky.io`.
    pub base_url: String,
    /// Path appended to `base_url`. Escaped when the URL is built.
    pub path: String,
    pub headers: BTreeMap<String, String>,
    /// Query parameters (non-mutating methods) or JSON body (mutating).
    pub params: Option<Map<String, Value>>,
}

impl FetchDescriptor {
    pub fn new(method: HttpMethod, base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            base_url: base_url.into(),
            path: path.into(),
            headers: BTreeMap::new(),
            params: None,
        }
    }

    /// Shorthand for a GET descriptor.
    pub fn get(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, base_url, path)
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add or replace one parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace all parameters.
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "errorItems")]
    pub error_items: Option<BTreeMap<String, String>>,
}

/// Classified failure of a remote fetch.
///
/// Propagated verbatim through the orchestrator, so it is `Clone` and
/// comparable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The response body does not match the expected shape.
    #[error("Response data could not be decoded")]
    MalformedResponse,

    /// The descriptor does not produce a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection, TLS, timeout or other transport failure.
    #[error("Request failed: {0}")]
    Transport(String),

    /// Failure with no further classification.
    #[error("Unknown network failure")]
    Unknown,

    /// HTTP 401.
    #[error("Authorization expired")]
    AuthorizationExpired,

    /// Non-2xx status with an API error body.
    #[error("Server error (code: {}, message: {})", .code.as_deref().unwrap_or("-"), .message.as_deref().unwrap_or("-"))]
    ServerError {
        code: Option<String>,
        message: Option<String>,
    },

    /// Non-2xx status without a usable error body.
    #[error("HTTP {0} with no error body")]
    HttpStatus(u16),

    /// The request could not be assembled (e.g. body encoding failed).
    #[error("Could not build request: {0}")]
    RequestConstruction(String),
}

/// Performs the network call for a descriptor.
///
/// Implementations own URL construction and outcome classification; retry
/// policy, if any, lives here too. The returned bytes are the raw success
/// body.
pub trait RemoteFetcher: Send + Sync {
    fn fetch<'a>(&'a self, descriptor: &'a FetchDescriptor) -> BoxFuture<'a, Result<Vec<u8>, FetchError>>;
}
