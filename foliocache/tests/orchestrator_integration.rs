//! Integration tests for the cache-first orchestrator.
//!
//! These tests run `DataOrchestrator` over a real `TieredCache` with a
//! counting fetcher:
//! - cache hits never reach the fetcher
//! - misses fetch once and populate both tiers
//! - fetch failures leave the cache untouched
//! - the portfolio holdings scenario end to end
//!
//! Run with: `cargo test --test orchestrator_integration`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use tempfile::TempDir;

use foliocache::cache::{BoxFuture, CacheConfig, KeyedStore, TieredCache};
use foliocache::codec::{decode, encode};
use foliocache::fetch::{FetchDescriptor, FetchError, RemoteFetcher};
use foliocache::orchestrator::{DataOrchestrator, DecodeFailurePolicy, Resolution};
use foliocache::portfolio::{holdings_descriptor, Holdings, StockHolding, PORTFOLIO_CACHE_KEY};

// ============================================================================
// Helper Functions
// ============================================================================

/// Fetcher returning a fixed outcome and counting calls.
struct CountingFetcher {
    outcome: Result<Vec<u8>, FetchError>,
    calls: AtomicUsize,
}

impl CountingFetcher {
    fn ok(body: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(body),
            calls: AtomicUsize::new(0),
        })
    }

    fn err(error: FetchError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteFetcher for CountingFetcher {
    fn fetch<'a>(
        &'a self,
        _descriptor: &'a FetchDescriptor,
    ) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

fn holding(symbol: &str, quantity: f64, ltp: f64, avg_price: &str, previous_close: f64) -> StockHolding {
    StockHolding {
        symbol: symbol.to_string(),
        quantity,
        ltp,
        avg_price: avg_price.to_string(),
        previous_close,
    }
}

/// Four positions, as served by the holdings endpoint.
fn sample_holdings() -> Holdings {
    Holdings {
        data: vec![
            holding("ASHOKLEY", 3.0, 119.1, "111.45", 120.5),
            holding("HDFC", 7.0, 2497.2, "2605.85", 2510.0),
            holding("ICICIBANK", 1.0, 624.7, "489.10", 630.25),
            holding("IDEA", 71.0, 9.95, "9.02", 10.1),
        ],
    }
}

fn open_default(temp: &TempDir) -> Arc<TieredCache> {
    Arc::new(TieredCache::open(CacheConfig::new("Default").with_root(temp.path())).unwrap())
}

fn descriptor() -> FetchDescriptor {
    holdings_descriptor("https://run.mocky.io")
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Scenario: first resolve fetches and populates, second is served from cache.
#[tokio::test]
async fn test_portfolio_scenario() {
    let temp = TempDir::new().unwrap();
    let cache = open_default(&temp);
    let fetcher = CountingFetcher::ok(encode(&sample_holdings()).unwrap());
    let orchestrator = DataOrchestrator::new(cache.clone()).with_fetcher(fetcher.clone());

    let first = orchestrator
        .resolve::<Holdings>(&descriptor(), PORTFOLIO_CACHE_KEY)
        .await;
    assert_eq!(first, Resolution::Done(sample_holdings()));
    assert_eq!(fetcher.calls(), 1);

    cache.flush().await;
    let on_disk: Holdings = decode(&cache.read_disk(PORTFOLIO_CACHE_KEY).await.unwrap()).unwrap();
    assert_eq!(on_disk.len(), 4);
    assert_eq!(on_disk, sample_holdings());

    let second = orchestrator
        .resolve::<Holdings>(&descriptor(), PORTFOLIO_CACHE_KEY)
        .await;
    assert_eq!(second, Resolution::Done(sample_holdings()));
    assert_eq!(fetcher.calls(), 1);
}

/// A fresh process finds the entry on disk and never fetches.
#[tokio::test]
async fn test_cached_on_disk_from_previous_run() {
    let temp = TempDir::new().unwrap();
    {
        let cache = open_default(&temp);
        cache
            .write(PORTFOLIO_CACHE_KEY, encode(&sample_holdings()).unwrap())
            .wait()
            .await
            .unwrap();
    }

    let cache = open_default(&temp);
    let fetcher = CountingFetcher::ok(Vec::new());
    let orchestrator = DataOrchestrator::new(cache.clone()).with_fetcher(fetcher.clone());

    let result = orchestrator
        .resolve::<Holdings>(&descriptor(), PORTFOLIO_CACHE_KEY)
        .await;

    assert_eq!(result, Resolution::Done(sample_holdings()));
    assert_eq!(fetcher.calls(), 0);
    assert!(cache.has_memory(PORTFOLIO_CACHE_KEY));
}

/// Keys are opaque: path-like keys populate and serve like any other.
#[tokio::test]
async fn test_path_like_key_is_cached() {
    let temp = TempDir::new().unwrap();
    let cache = open_default(&temp);
    let fetcher = CountingFetcher::ok(encode(&sample_holdings()).unwrap());
    let orchestrator = DataOrchestrator::new(cache.clone()).with_fetcher(fetcher.clone());

    let first = orchestrator.resolve::<Holdings>(&descriptor(), "holdings/v2").await;
    assert!(first.is_done());
    assert!(cache.has("holdings/v2").await);

    let second = orchestrator.resolve::<Holdings>(&descriptor(), "holdings/v2").await;
    assert_eq!(second, Resolution::Done(sample_holdings()));
    assert_eq!(fetcher.calls(), 1);

    cache.flush().await;
    assert!(cache.has_disk("holdings/v2").await);
    assert!(cache.path("holdings/v2").starts_with(cache.directory()));
}

#[tokio::test]
async fn test_fetch_failure_leaves_cache_untouched() {
    let temp = TempDir::new().unwrap();
    let cache = open_default(&temp);
    let fetcher = CountingFetcher::err(FetchError::AuthorizationExpired);
    let orchestrator = DataOrchestrator::new(cache.clone()).with_fetcher(fetcher);

    let result = orchestrator
        .resolve::<Holdings>(&descriptor(), PORTFOLIO_CACHE_KEY)
        .await;

    assert_eq!(result, Resolution::Failed(FetchError::AuthorizationExpired));
    cache.flush().await;
    assert!(!cache.has(PORTFOLIO_CACHE_KEY).await);
    assert!(!cache.directory().exists());
}

#[tokio::test]
async fn test_corrupt_entry_policies() {
    let temp = TempDir::new().unwrap();
    let cache = open_default(&temp);
    cache
        .write_disk(PORTFOLIO_CACHE_KEY, b"{\"data\": 42}".to_vec())
        .wait()
        .await
        .unwrap();

    let fetcher = CountingFetcher::ok(encode(&sample_holdings()).unwrap());

    let lenient = DataOrchestrator::new(cache.clone()).with_fetcher(fetcher.clone());
    let result = lenient
        .resolve::<Holdings>(&descriptor(), PORTFOLIO_CACHE_KEY)
        .await;
    assert_eq!(result, Resolution::Empty);
    assert_eq!(fetcher.calls(), 0);

    let refetching = DataOrchestrator::new(cache.clone())
        .with_fetcher(fetcher.clone())
        .with_decode_policy(DecodeFailurePolicy::FetchRemote);
    let result = refetching
        .resolve::<Holdings>(&descriptor(), PORTFOLIO_CACHE_KEY)
        .await;
    assert_eq!(result, Resolution::Done(sample_holdings()));
    assert_eq!(fetcher.calls(), 1);

    cache.flush().await;
    let repaired: Holdings = decode(&cache.read_disk(PORTFOLIO_CACHE_KEY).await.unwrap()).unwrap();
    assert_eq!(repaired, sample_holdings());
}

#[tokio::test]
async fn test_malformed_response_is_not_cached() {
    let temp = TempDir::new().unwrap();
    let cache = open_default(&temp);
    let fetcher = CountingFetcher::ok(b"<html>maintenance</html>".to_vec());
    let orchestrator = DataOrchestrator::new(cache.clone()).with_fetcher(fetcher);

    let result = orchestrator
        .resolve::<Holdings>(&descriptor(), PORTFOLIO_CACHE_KEY)
        .await;

    assert_eq!(result, Resolution::Failed(FetchError::MalformedResponse));
    assert!(!cache.has(PORTFOLIO_CACHE_KEY).await);
}

// ============================================================================
// Property Tests
// ============================================================================

fn holding_strategy() -> impl Strategy<Value = StockHolding> {
    (
        "[A-Z]{1,10}",
        0u32..10_000,
        0u32..4_000_000,
        "[0-9]{1,5}\\.[0-9]{2}",
        0u32..4_000_000,
    )
        .prop_map(|(symbol, quantity, ltp, avg_price, previous_close)| StockHolding {
            symbol,
            quantity: quantity as f64,
            ltp: ltp as f64 / 4.0,
            avg_price,
            previous_close: previous_close as f64 / 4.0,
        })
}

proptest! {
    #[test]
    fn prop_holdings_survive_codec(data in proptest::collection::vec(holding_strategy(), 0..8)) {
        let holdings = Holdings { data };
        let decoded: Holdings = decode(&encode(&holdings).unwrap()).unwrap();
        prop_assert_eq!(decoded, holdings);
    }
}
