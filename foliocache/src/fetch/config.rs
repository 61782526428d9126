//! Network configuration passed to the HTTP client at construction.

use std::time::Duration;

/// Base URL of the portfolio API.
pub const DEFAULT_BASE_URL: &str = "https://run.mocky.io";

/// Connect timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Whole-request timeout, including reading the body.
pub const DEFAULT_RESOURCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`ReqwestClient`](super::ReqwestClient).
///
/// There is no process-wide default client; build one from a
/// `FetchConfig` and hand it to whoever needs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub resource_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            resource_timeout: DEFAULT_RESOURCE_TIMEOUT,
            user_agent: format!("foliocache/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeouts(mut self, request: Duration, resource: Duration) -> Self {
        self.request_timeout = request;
        self.resource_timeout = resource;
        self
    }
}
