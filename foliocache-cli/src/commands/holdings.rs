//! Holdings command - show the portfolio through the cache.

use foliocache::cache::KeyedStore;
use foliocache::orchestrator::Resolution;
use foliocache::portfolio::{Holdings, PORTFOLIO_CACHE_KEY};

use super::common::Context;
use crate::error::CliError;

/// Run the holdings command.
pub async fn run(ctx: &Context, refresh: bool) -> Result<(), CliError> {
    let app = ctx.start_app().await?;

    let cached = app.cache().has(PORTFOLIO_CACHE_KEY).await;
    if refresh && cached {
        app.cache().remove(PORTFOLIO_CACHE_KEY).await;
    }
    let from_cache = cached && !refresh;

    let result = app.holdings().await;
    app.shutdown().await;

    match result {
        Resolution::Done(holdings) => {
            print_holdings(&holdings);
            println!();
            println!(
                "{} holdings ({})",
                holdings.len(),
                if from_cache { "cached" } else { "fetched" }
            );
            Ok(())
        }
        Resolution::Failed(e) => Err(CliError::Fetch(e)),
        Resolution::Empty => {
            println!("No holdings available: the cached entry could not be read.");
            println!("Run with --refresh to fetch them again.");
            Ok(())
        }
    }
}

fn print_holdings(holdings: &Holdings) {
    println!(
        "{:<12} {:>10} {:>12} {:>12} {:>14}",
        "SYMBOL", "QTY", "LTP", "AVG PRICE", "PREV CLOSE"
    );
    for holding in holdings.iter() {
        println!(
            "{:<12} {:>10} {:>12.2} {:>12} {:>14.2}",
            holding.symbol, holding.quantity, holding.ltp, holding.avg_price, holding.previous_close
        );
    }
}
