//! Application error types.

use std::fmt;

use crate::cache::CacheError;
use crate::fetch::FetchError;

/// Errors that can occur during application start.
#[derive(Debug)]
pub enum AppError {
    /// Failed to open the cache instance.
    CacheOpen(CacheError),

    /// Failed to build the HTTP client.
    HttpClient(FetchError),

    /// Configuration error.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::CacheOpen(e) => write!(f, "Failed to open cache: {}", e),
            AppError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::CacheOpen(e) => Some(e),
            AppError::HttpClient(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}

impl From<CacheError> for AppError {
    fn from(e: CacheError) -> Self {
        AppError::CacheOpen(e)
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::HttpClient(e)
    }
}
