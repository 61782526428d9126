//! Types and helpers shared across CLI commands.

use std::path::PathBuf;

use foliocache::app::{AppConfig, FolioApp};
use foliocache::config::ConfigFile;
use serde_json::Value;

use crate::error::CliError;

/// Loaded configuration passed to every command.
pub struct Context {
    pub config: ConfigFile,
    /// Where `config` was loaded from (it may not exist yet).
    pub config_path: PathBuf,
}

impl Context {
    pub fn app_config(&self) -> AppConfig {
        AppConfig::from_config_file(&self.config)
    }

    /// Start the application from the loaded configuration.
    pub async fn start_app(&self) -> Result<FolioApp, CliError> {
        Ok(FolioApp::start(self.app_config()).await?)
    }
}

/// Interpret a command-line value as JSON, falling back to a string.
///
/// `42`, `true`, `[1,2]` and `{"a":1}` keep their JSON type; anything that
/// does not parse (`dark`, `hello world`) becomes a JSON string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Render a JSON value for display. Strings print without quotes.
pub fn display_value(value: &Value) -> Result<String, CliError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string_pretty(other).map_err(|e| CliError::Output(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("[\"TCS\"]"), json!(["TCS"]));
        assert_eq!(parse_value("dark"), json!("dark"));
        assert_eq!(parse_value("\"quoted\""), json!("quoted"));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("dark")).unwrap(), "dark");
        assert_eq!(display_value(&json!(3)).unwrap(), "3");
    }
}
