//! Settings store CLI commands.
//!
//! Every action except `create` is dispatched through the orchestrator as a
//! settings-store command.

use clap::Subcommand;
use foliocache::orchestrator::{DataRequest, Execution, StoreAction, StoreCommand, StoreKind};
use serde_json::Value;

use super::common::{display_value, parse_value, Context};
use crate::error::CliError;

/// Store used when `--store` is not given.
const DEFAULT_STORE: &str = "Preferences";

/// Settings subcommands.
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Create an empty store if it does not exist
    Create {
        #[arg(long, default_value = DEFAULT_STORE)]
        store: String,
    },
    /// Print the value of a key
    Get {
        key: String,
        #[arg(long, default_value = DEFAULT_STORE)]
        store: String,
    },
    /// Insert or overwrite a key (value parsed as JSON, else string)
    Set {
        key: String,
        value: String,
        #[arg(long, default_value = DEFAULT_STORE)]
        store: String,
    },
    /// Insert a key that must not exist yet
    Add {
        key: String,
        value: String,
        #[arg(long, default_value = DEFAULT_STORE)]
        store: String,
    },
    /// Remove one key
    Remove {
        key: String,
        #[arg(long, default_value = DEFAULT_STORE)]
        store: String,
    },
    /// Remove every key
    Clear {
        #[arg(long, default_value = DEFAULT_STORE)]
        store: String,
    },
}

impl SettingsAction {
    /// The store command for this action, or `None` for `create`.
    pub fn to_command(&self) -> Option<StoreCommand> {
        let command = match self {
            SettingsAction::Create { .. } => return None,
            SettingsAction::Get { key, store } => StoreCommand::new(store, StoreAction::Get, key),
            SettingsAction::Set { key, value, store } => {
                StoreCommand::new(store, StoreAction::AddOrSave, key).with_value(parse_value(value))
            }
            SettingsAction::Add { key, value, store } => {
                StoreCommand::new(store, StoreAction::AddNew, key).with_value(parse_value(value))
            }
            SettingsAction::Remove { key, store } => {
                StoreCommand::new(store, StoreAction::RemoveOne, key)
            }
            SettingsAction::Clear { store } => StoreCommand::new(store, StoreAction::RemoveAll, ""),
        };
        Some(command)
    }
}

/// Run a settings subcommand.
pub async fn run(action: SettingsAction, ctx: &Context) -> Result<(), CliError> {
    let app = ctx.start_app().await?;

    let Some(command) = action.to_command() else {
        if let SettingsAction::Create { store } = &action {
            let created = app
                .settings()
                .create_store(store)
                .map_err(|e| CliError::Settings(e.into()))?;
            if created {
                println!("Created store '{}'", store);
            } else {
                println!("Store '{}' already exists", store);
            }
        }
        return Ok(());
    };

    let execution = app
        .orchestrator()
        .execute::<Value>(DataRequest::Persistent(StoreKind::Settings(command.clone())))
        .await?;

    match execution {
        Execution::Stored(Some(value)) => println!("{}", display_value(&value)?),
        Execution::Stored(None) => println!("{} '{}' in '{}': ok", command.action, command.key, command.store),
        Execution::Resolved(_) => {}
    }

    Ok(())
}
