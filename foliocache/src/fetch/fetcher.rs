//! HTTP-backed [`RemoteFetcher`].
//!
//! # Classification
//!
//! | Outcome                              | Result                        |
//! |--------------------------------------|-------------------------------|
//! | 2xx                                  | `Ok(body)`                    |
//! | 401                                  | `AuthorizationExpired`        |
//! | other, body is an API error object   | `ServerError { code, message }` |
//! | other                                | `HttpStatus(status)`          |
//! | no response                          | the client's transport error  |

use tracing::debug;

use crate::cache::BoxFuture;

use super::http::{AsyncHttpClient, HttpResponse};
use super::request::build_request;
use super::types::{ApiErrorBody, FetchDescriptor, FetchError, RemoteFetcher};

/// Remote fetcher over an [`AsyncHttpClient`].
///
/// # Example
///
/// ```ignore
/// use foliocache::fetch::{FetchConfig, HttpFetcher, ReqwestClient};
///
/// let client = ReqwestClient::new(&FetchConfig::default())?;
/// let fetcher = HttpFetcher::new(client);
/// ```
pub struct HttpFetcher<C: AsyncHttpClient> {
    http_client: C,
}

impl<C: AsyncHttpClient> HttpFetcher<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }
}

/// Map an HTTP response to the fetch outcome.
pub fn classify_response(response: HttpResponse) -> Result<Vec<u8>, FetchError> {
    match response.status {
        200..=299 => Ok(response.body),
        401 => Err(FetchError::AuthorizationExpired),
        status => match serde_json::from_slice::<ApiErrorBody>(&response.body) {
            Ok(body) if body.code.is_some() || body.message.is_some() => {
                Err(FetchError::ServerError {
                    code: body.code,
                    message: body.message,
                })
            }
            _ => Err(FetchError::HttpStatus(status)),
        },
    }
}

impl<C: AsyncHttpClient> RemoteFetcher for HttpFetcher<C> {
    fn fetch<'a>(&'a self, descriptor: &'a FetchDescriptor) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
        Box::pin(async move {
            let request = build_request(descriptor)?;
            debug!(method = %request.method, url = %request.url, "Fetching");

            let response = self.http_client.send(request).await?;
            debug!(status = response.status, bytes = response.body.len(), "Fetched");

            classify_response(response)
        })
    }
}
