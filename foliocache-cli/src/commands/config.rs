//! Configuration management CLI commands.

use std::path::Path;

use clap::Subcommand;
use foliocache::config::ConfigFile;

use super::common::Context;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the configuration file path
    Path,
    /// Show the effective configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(action: ConfigAction, ctx: &Context) -> Result<(), CliError> {
    match action {
        ConfigAction::Path => {
            println!("{}", ctx.config_path.display());
        }
        ConfigAction::Show => {
            if !ctx.config_path.exists() {
                println!("# {} does not exist, showing defaults", ctx.config_path.display());
                println!();
            }
            print!("{}", ctx.config);
        }
        ConfigAction::Init { force } => {
            if init_config(&ctx.config_path, force)? {
                println!("Configuration file: {}", ctx.config_path.display());
                println!();
                println!("Edit this file to customize foliocache settings.");
            } else {
                println!(
                    "{} already exists (use --force to overwrite)",
                    ctx.config_path.display()
                );
            }
        }
    }
    Ok(())
}

/// Write defaults to `path`. Returns `false` if the file exists and
/// `force` is not set.
fn init_config(path: &Path, force: bool) -> Result<bool, CliError> {
    if path.exists() && !force {
        return Ok(false);
    }
    ConfigFile::default().save_to(path)?;
    Ok(true)
}
