//! Remote fetch collaborator.
//!
//! The orchestrator only sees the [`RemoteFetcher`] trait. The HTTP
//! implementation is split the same way the rest of the crate splits I/O:
//!
//! - [`AsyncHttpClient`]: sends a built request, mockable in tests
//! - [`build_request`]: descriptor → URL, headers and body
//! - [`HttpFetcher`]: glues the two and classifies the outcome
//!
//! ```ignore
//! use foliocache::fetch::{FetchConfig, FetchDescriptor, HttpFetcher, ReqwestClient};
//!
//! let fetcher = HttpFetcher::new(ReqwestClient::new(&FetchConfig::default())?);
//! let body = fetcher.fetch(&FetchDescriptor::get("https://run.mocky.io", "/v3/x")).await?;
//! ```

mod config;
mod fetcher;
mod http;
mod request;
mod types;

pub use config::{FetchConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESOURCE_TIMEOUT};
pub use fetcher::{classify_response, HttpFetcher};
pub use http::{AsyncHttpClient, HttpRequest, HttpResponse, ReqwestClient};
pub use request::build_request;
pub use types::{ApiErrorBody, FetchDescriptor, FetchError, HttpMethod, RemoteFetcher};
