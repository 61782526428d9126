//! Cache management CLI commands.

use clap::Subcommand;
use foliocache::cache::{CacheConfig, CacheStats, KeyedStore, TieredCache};
use foliocache::config::{format_size, retention_from_days};

use super::common::Context;
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show memory and disk statistics
    Stats,
    /// Delete every entry of the cache instance
    Clear,
    /// Delete disk entries older than the retention period
    Sweep {
        /// Maximum age in days (default: cache.retention_days)
        #[arg(long)]
        max_age_days: Option<u64>,
    },
    /// Print the disk path for a key
    Path {
        key: String,
    },
    /// Remove one key from both tiers
    Remove {
        key: String,
    },
}

/// Run a cache subcommand.
pub async fn run(action: CacheAction, ctx: &Context) -> Result<(), CliError> {
    let config: CacheConfig = ctx.app_config().cache;
    let cache = TieredCache::open(config)?;

    match action {
        CacheAction::Stats => {
            let stats = cache.stats().await?;
            println!("Cache '{}': {}", cache.name(), cache.directory().display());
            for line in stats_lines(&stats) {
                println!("  {}", line);
            }
        }
        CacheAction::Clear => {
            println!("Clearing cache at: {}", cache.directory().display());
            let result = cache.clear().await?;
            println!(
                "Deleted {} files, freed {}",
                result.entries_removed,
                format_size(result.bytes_freed)
            );
        }
        CacheAction::Sweep { max_age_days } => {
            let days = max_age_days.unwrap_or(ctx.config.cache.retention_days);
            let result = cache.sweep_expired(retention_from_days(days)).await?;
            println!(
                "Deleted {} files older than {} days, freed {}",
                result.entries_removed,
                days,
                format_size(result.bytes_freed)
            );
        }
        CacheAction::Path { key } => {
            println!("{}", cache.path(&key).display());
        }
        CacheAction::Remove { key } => {
            if cache.remove(&key).await {
                println!("Removed '{}'", key);
            } else {
                println!("'{}' is not cached", key);
            }
        }
    }

    Ok(())
}

/// Report lines for `cache stats`.
///
/// The memory tier lives in this process only, so a fresh CLI run always
/// reports it empty.
fn stats_lines(stats: &CacheStats) -> Vec<String> {
    vec![
        format!("Disk files:     {}", stats.disk_files),
        format!("Disk size:      {}", format_size(stats.disk_bytes)),
        format!(
            "Memory entries: {} ({}, this process only)",
            stats.memory_entries,
            format_size(stats.memory_bytes)
        ),
        format!(
            "Memory lookups: {} hits, {} misses",
            stats.memory_hits, stats.memory_misses
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_lines_cover_both_tiers() {
        let stats = CacheStats {
            memory_entries: 2,
            memory_bytes: 512,
            memory_hits: 5,
            memory_misses: 1,
            disk_files: 3,
            disk_bytes: 2048,
        };

        let lines = stats_lines(&stats);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Disk files:     3");
        assert!(lines[1].starts_with("Disk size:"));
        assert!(lines[2].starts_with("Memory entries: 2 ("));
        assert!(lines[2].ends_with("this process only)"));
        assert_eq!(lines[3], "Memory lookups: 5 hits, 1 misses");
    }
}
