//! foliocache CLI - Command-line interface
//!
//! Resolves the portfolio through the cache-first orchestrator and exposes
//! cache, settings and configuration maintenance.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use foliocache::config::{config_file_path, ConfigFile};
use foliocache::logging::{init_logging, LoggingConfig};

use commands::cache::CacheAction;
use commands::common::Context;
use commands::config::ConfigAction;
use commands::settings::SettingsAction;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "foliocache", version, about = "Two-tier cache and cache-first portfolio data")]
struct Cli {
    /// Configuration file (default: ~/.foliocache/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show portfolio holdings, from cache when available
    Holdings {
        /// Drop the cached holdings and fetch again
        #[arg(long)]
        refresh: bool,
    },

    /// Resolve a JSON GET endpoint through the cache
    Fetch {
        /// Full URL to fetch on a cache miss
        url: String,

        /// Cache key to store the response under
        #[arg(long)]
        key: String,
    },

    /// Inspect and maintain the cache instance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Read and edit settings stores
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Show or initialize the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.unwrap_or_else(config_file_path);
    let config = ConfigFile::load_from(&config_path)?;

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let logging = LoggingConfig {
        level,
        directory: config.logging.directory.clone(),
    };
    let _guard = match init_logging(&logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };
    tracing::debug!(path = %config_path.display(), "Loaded configuration");

    let ctx = Context {
        config,
        config_path,
    };

    // Config commands run without a runtime
    let command = match cli.command {
        Commands::Config { action } => return commands::config::run(action, &ctx),
        other => other,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    runtime.block_on(async move {
        match command {
            Commands::Holdings { refresh } => commands::holdings::run(&ctx, refresh).await,
            Commands::Fetch { url, key } => commands::fetch::run(&ctx, &url, &key).await,
            Commands::Cache { action } => commands::cache::run(action, &ctx).await,
            Commands::Settings { action } => commands::settings::run(action, &ctx).await,
            Commands::Config { action } => commands::config::run(action, &ctx),
        }
    })
}
