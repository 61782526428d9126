//! Fetch command - resolve an arbitrary JSON endpoint through the cache.

use foliocache::fetch::FetchDescriptor;
use foliocache::orchestrator::Resolution;
use serde_json::Value;

use super::common::{display_value, Context};
use crate::error::CliError;

/// Run the fetch command.
pub async fn run(ctx: &Context, url: &str, key: &str) -> Result<(), CliError> {
    let app = ctx.start_app().await?;

    // The whole URL is the base; the descriptor path stays empty
    let descriptor = FetchDescriptor::get(url, "");
    let result = app.orchestrator().resolve::<Value>(&descriptor, key).await;
    app.shutdown().await;

    match result {
        Resolution::Done(value) => {
            println!("{}", display_value(&value)?);
            Ok(())
        }
        Resolution::Failed(e) => Err(CliError::Fetch(e)),
        Resolution::Empty => {
            println!("Cached entry '{}' is not valid JSON.", key);
            Ok(())
        }
    }
}
