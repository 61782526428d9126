//! Application bootstrap implementation.

use std::sync::Arc;

use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::cache::{KeyedStore, TieredCache};
use crate::fetch::{HttpFetcher, RemoteFetcher, ReqwestClient};
use crate::orchestrator::{DataOrchestrator, Resolution};
use crate::portfolio::{holdings_descriptor, Holdings, PORTFOLIO_CACHE_KEY};
use crate::settings::FileSettingsStore;

/// A running foliocache instance.
///
/// Owns the cache instance, the settings store and the orchestrator over
/// them. Must be started inside a Tokio runtime.
///
/// # Example
///
/// ```ignore
/// let app = FolioApp::start(AppConfig::new("Default")).await?;
/// match app.holdings().await {
///     Resolution::Done(holdings) => println!("{} positions", holdings.len()),
///     Resolution::Failed(e) => eprintln!("{}", e),
///     Resolution::Empty => {}
/// }
/// app.shutdown().await;
/// ```
pub struct FolioApp {
    cache: Arc<TieredCache>,
    settings: Arc<FileSettingsStore>,
    orchestrator: DataOrchestrator,
    config: AppConfig,
}

impl FolioApp {
    /// Start with a reqwest-backed fetcher built from `config.fetch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the cache
    /// cannot be opened.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let client = ReqwestClient::new(&config.fetch)?;
        Self::start_with_fetcher(config, Arc::new(HttpFetcher::new(client))).await
    }

    /// Start with the given remote fetcher.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `fetcher` - Fetcher used on cache misses
    pub async fn start_with_fetcher(
        config: AppConfig,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let cache = Arc::new(TieredCache::open(config.cache.clone())?);
        info!(
            cache = cache.name(),
            directory = %cache.directory().display(),
            "Cache opened"
        );

        if config.sweep_on_start {
            match cache.sweep_expired(config.retention).await {
                Ok(result) => info!(cache = cache.name(), "Startup sweep: {}", result),
                Err(e) => warn!(cache = cache.name(), error = %e, "Startup sweep failed"),
            }
        }

        let settings = Arc::new(FileSettingsStore::new(config.settings_directory.clone()));

        let store: Arc<dyn KeyedStore> = cache.clone();
        let orchestrator = DataOrchestrator::new(store)
            .with_fetcher(fetcher)
            .with_settings(settings.clone())
            .with_decode_policy(config.decode_policy);

        Ok(Self {
            cache,
            settings,
            orchestrator,
            config,
        })
    }

    pub fn cache(&self) -> &Arc<TieredCache> {
        &self.cache
    }

    pub fn settings(&self) -> &Arc<FileSettingsStore> {
        &self.settings
    }

    pub fn orchestrator(&self) -> &DataOrchestrator {
        &self.orchestrator
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Resolve the portfolio holdings under the `Portfolio` key.
    pub async fn holdings(&self) -> Resolution<Holdings> {
        let descriptor = holdings_descriptor(&self.config.fetch.base_url);
        self.orchestrator
            .resolve(&descriptor, PORTFOLIO_CACHE_KEY)
            .await
    }

    /// Wait for queued disk writes, then stop.
    pub async fn shutdown(self) {
        self.cache.flush().await;
        info!(cache = self.cache.name(), "Shut down");
    }
}
