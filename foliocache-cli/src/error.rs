//! CLI error type.

use std::fmt;

use foliocache::app::AppError;
use foliocache::cache::CacheError;
use foliocache::config::ConfigError;
use foliocache::fetch::FetchError;
use foliocache::orchestrator::OrchestratorError;

/// Errors reported by CLI commands. Each maps to exit code 1.
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be read, parsed or written.
    Config(String),
    /// Application failed to start.
    App(AppError),
    /// Cache maintenance failed.
    Cache(CacheError),
    /// Remote fetch failed.
    Fetch(FetchError),
    /// Settings store command failed.
    Settings(OrchestratorError),
    /// Tokio runtime could not be created.
    Runtime(String),
    /// Output could not be produced.
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Cache(e) => write!(f, "Cache error: {}", e),
            CliError::Fetch(e) => write!(f, "Fetch failed: {}", e),
            CliError::Settings(e) => write!(f, "{}", e),
            CliError::Runtime(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
            CliError::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::App(e) => Some(e),
            CliError::Cache(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            CliError::Settings(e) => Some(e),
            CliError::Config(_) | CliError::Runtime(_) | CliError::Output(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}

impl From<OrchestratorError> for CliError {
    fn from(e: OrchestratorError) -> Self {
        CliError::Settings(e)
    }
}
