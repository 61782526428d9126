//! foliocache - two-tier caching and cache-first data access
//!
//! This library provides a keyed memory + disk cache, a JSON codec, a
//! remote fetcher over HTTP, named settings stores, and an orchestrator that
//! serves typed values from the cache or fetches and populates on a miss.

pub mod app;
pub mod cache;
pub mod codec;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod orchestrator;
pub mod portfolio;
pub mod settings;
