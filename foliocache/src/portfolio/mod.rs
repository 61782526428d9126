//! Stock holdings payload and endpoint.
//!
//! Data only: the shapes returned by the holdings endpoint and the
//! descriptor that requests them. Valuation arithmetic is left to callers.

use serde::{Deserialize, Serialize};

use crate::fetch::FetchDescriptor;

/// Cache key the holdings are stored under.
pub const PORTFOLIO_CACHE_KEY: &str = "Portfolio";

/// Path of the holdings endpoint, relative to the API base URL.
pub const HOLDINGS_PATH: &str = "/v3/a6376fa8-18f8-4d64-8adb-18fe376b699a";

/// One position in the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHolding {
    pub symbol: String,
    pub quantity: f64,
    /// Last traded price.
    pub ltp: f64,
    /// Average buy price, as sent by the API.
    pub avg_price: String,
    pub previous_close: f64,
}

/// Holdings response body: `{"data": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    pub data: Vec<StockHolding>,
}

impl Holdings {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StockHolding> {
        self.data.iter()
    }
}

/// GET descriptor for the holdings endpoint under `base_url`.
pub fn holdings_descriptor(base_url: &str) -> FetchDescriptor {
    FetchDescriptor::get(base_url, HOLDINGS_PATH).with_header("Content-Type", "application/json")
}
