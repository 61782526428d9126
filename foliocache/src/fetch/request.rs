//! Turning a [`FetchDescriptor`] into an [`HttpRequest`].
//!
//! # Rules
//!
//! - URL is `base_url + path`; characters not allowed in a URL are
//!   percent-escaped by the parser
//! - Non-mutating methods: scalar parameters become query pairs, sorted by
//!   name, empty names dropped; nested values are skipped
//! - Mutating methods: parameters become a JSON body, and
//!   `Content-Type: application/json` is added unless already set

use reqwest::Url;
use serde_json::Value;

use super::http::HttpRequest;
use super::types::{FetchDescriptor, FetchError};

/// Build the HTTP request for `descriptor`.
pub fn build_request(descriptor: &FetchDescriptor) -> Result<HttpRequest, FetchError> {
    let raw = format!("{}{}", descriptor.base_url, descriptor.path);
    let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))?;

    let mut headers: Vec<(String, String)> = descriptor
        .headers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut body = None;

    if let Some(params) = descriptor.params.as_ref().filter(|p| !p.is_empty()) {
        if descriptor.method.is_mutating() {
            let encoded = serde_json::to_vec(params)
                .map_err(|e| FetchError::RequestConstruction(e.to_string()))?;
            body = Some(encoded);

            let has_content_type = headers
                .iter()
                .any(|(k, _)| k.eq_ignore_ascii_case("content-type"));
            if !has_content_type {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
            }
        } else {
            let pairs: Vec<(&str, String)> = params
                .iter()
                .filter(|(name, _)| !name.is_empty())
                .filter_map(|(name, value)| query_value(value).map(|v| (name.as_str(), v)))
                .collect();

            if !pairs.is_empty() {
                let mut query = url.query_pairs_mut();
                for (name, value) in pairs {
                    query.append_pair(name, &value);
                }
            }
        }
    }

    Ok(HttpRequest {
        method: descriptor.method,
        url: url.to_string(),
        headers,
        body,
    })
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
