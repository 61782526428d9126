//! HTTP client abstraction for testability.

use std::future::Future;

use super::config::FetchConfig;
use super::types::{FetchError, HttpMethod};

/// A fully built HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Trait for async HTTP client operations.
///
/// Allows dependency injection of mock clients in tests. Implementations
/// report only transport-level failures as errors; any received response,
/// whatever its status, is `Ok`.
pub trait AsyncHttpClient: Send + Sync {
    /// Send `request` and return the response.
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client from `config`.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .timeout(config.resource_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                FetchError::RequestConstruction(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                FetchError::RequestConstruction(e.to_string())
            } else {
                FetchError::Transport(format!("Request to {} failed: {}", request.url, e))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response: {}", e)))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
