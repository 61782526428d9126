//! Application configuration for `FolioApp`.

use std::path::PathBuf;
use std::time::Duration;

use super::error::AppError;
use crate::cache::{validate_key, CacheConfig, DEFAULT_RETENTION};
use crate::config::{config_directory, ConfigFile};
use crate::fetch::FetchConfig;
use crate::orchestrator::DecodeFailurePolicy;

/// Everything `FolioApp::start` needs.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
    /// Directory of the settings stores.
    pub settings_directory: PathBuf,
    /// Age after which disk entries are swept.
    pub retention: Duration,
    /// Sweep expired disk entries during `start`.
    pub sweep_on_start: bool,
    pub decode_policy: DecodeFailurePolicy,
}

impl AppConfig {
    /// Defaults for the cache instance `cache_name`.
    pub fn new(cache_name: impl Into<String>) -> Self {
        Self {
            cache: CacheConfig::new(cache_name),
            fetch: FetchConfig::default(),
            settings_directory: config_directory().join("settings"),
            retention: DEFAULT_RETENTION,
            sweep_on_start: false,
            decode_policy: DecodeFailurePolicy::default(),
        }
    }

    /// Translate the loaded configuration file.
    ///
    /// # Arguments
    ///
    /// * `config` - The loaded configuration file
    pub fn from_config_file(config: &ConfigFile) -> Self {
        let cache = CacheConfig::new(config.cache.name.clone())
            .with_root(config.cache.directory.clone())
            .with_prefix(config.cache.prefix.clone())
            .with_memory_capacity(config.cache.memory_size);

        let mut fetch = FetchConfig::default()
            .with_base_url(config.network.base_url.clone())
            .with_timeouts(
                Duration::from_secs(config.network.request_timeout),
                Duration::from_secs(config.network.resource_timeout),
            );
        if let Some(agent) = &config.network.user_agent {
            fetch.user_agent = agent.clone();
        }

        Self {
            cache,
            fetch,
            settings_directory: config.settings.directory.clone(),
            retention: config.cache.retention(),
            sweep_on_start: config.cache.sweep_on_start,
            decode_policy: config.cache.on_decode_failure,
        }
    }

    /// Check values that would only fail later, deep inside `start`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the cache name cannot be used as a
    /// directory name or the base URL is empty.
    pub fn validate(&self) -> Result<(), AppError> {
        if validate_key(&self.cache.name).is_err() {
            return Err(AppError::Config(format!(
                "cache name {:?} is not a valid directory name",
                self.cache.name
            )));
        }
        if self.fetch.base_url.trim().is_empty() {
            return Err(AppError::Config("network base_url is empty".to_string()));
        }
        Ok(())
    }

    /// Set the cache root directory.
    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache = self.cache.with_root(root);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.fetch = self.fetch.with_base_url(base_url);
        self
    }

    pub fn with_settings_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.settings_directory = directory.into();
        self
    }

    pub fn with_sweep_on_start(mut self, retention: Duration) -> Self {
        self.sweep_on_start = true;
        self.retention = retention;
        self
    }

    pub fn with_decode_policy(mut self, policy: DecodeFailurePolicy) -> Self {
        self.decode_policy = policy;
        self
    }
}
