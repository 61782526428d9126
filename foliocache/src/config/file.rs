//! `ConfigFile`: load, validate and save `config.ini`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::size::{format_size, parse_size};
use crate::cache::{default_cache_root, DEFAULT_DIRECTORY_PREFIX, DEFAULT_MEMORY_CAPACITY};
use crate::fetch::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESOURCE_TIMEOUT};
use crate::orchestrator::DecodeFailurePolicy;

/// Name of the cache instance used when none is configured.
const DEFAULT_CACHE_NAME: &str = "Default";

const DEFAULT_RETENTION_DAYS: u64 = 7;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid INI.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A key holds a value of the wrong shape.
    #[error("Invalid value for {section}.{key}: '{value}' ({reason})")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// `~/.foliocache`, or `<temp>/.foliocache` without a home directory.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".foliocache")
}

/// `~/.foliocache/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSection {
    /// Cache instance name.
    pub name: String,
    /// Root directory holding instance directories.
    pub directory: PathBuf,
    /// Instance directory prefix.
    pub prefix: String,
    /// Memory tier capacity in bytes.
    pub memory_size: u64,
    pub retention_days: u64,
    /// Remove entries older than `retention_days` when the app starts.
    pub sweep_on_start: bool,
    pub on_decode_failure: DecodeFailurePolicy,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_CACHE_NAME.to_string(),
            directory: default_cache_root(),
            prefix: DEFAULT_DIRECTORY_PREFIX.to_string(),
            memory_size: DEFAULT_MEMORY_CAPACITY,
            retention_days: DEFAULT_RETENTION_DAYS,
            sweep_on_start: false,
            on_decode_failure: DecodeFailurePolicy::default(),
        }
    }
}

impl CacheSection {
    pub fn retention(&self) -> Duration {
        retention_from_days(self.retention_days)
    }
}

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Retention period for a day count, saturating instead of overflowing.
///
/// A saturated period is older than any file, so a sweep with it removes
/// nothing.
pub fn retention_from_days(days: u64) -> Duration {
    Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY))
}

/// `[network]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSection {
    pub base_url: String,
    /// Connect timeout in seconds.
    pub request_timeout: u64,
    /// Whole-request timeout in seconds.
    pub resource_timeout: u64,
    /// Overrides the default `foliocache/<version>` user agent.
    pub user_agent: Option<String>,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            resource_timeout: DEFAULT_RESOURCE_TIMEOUT.as_secs(),
            user_agent: None,
        }
    }
}

/// `[settings]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsSection {
    /// Directory holding `<store>.json` files.
    pub directory: PathBuf,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            directory: config_directory().join("settings"),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSection {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Directory for daily log files. Stderr only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// The parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub cache: CacheSection,
    pub network: NetworkSection,
    pub settings: SettingsSection,
    pub logging: LoggingSection,
}

impl ConfigFile {
    /// Load from [`config_file_path`]. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("cache")) {
            let cache = &mut config.cache;
            if let Some(v) = section.get("name") {
                if v.trim().is_empty() {
                    return Err(invalid("cache", "name", v, "must not be empty"));
                }
                cache.name = v.trim().to_string();
            }
            if let Some(v) = section.get("directory") {
                cache.directory = expand_tilde(v);
            }
            if let Some(v) = section.get("prefix") {
                cache.prefix = v.trim().to_string();
            }
            if let Some(v) = section.get("memory_size") {
                cache.memory_size = parse_size(v)
                    .ok_or_else(|| invalid("cache", "memory_size", v, "expected a size like 64MB"))?;
            }
            if let Some(v) = section.get("retention_days") {
                cache.retention_days = parse_number("cache", "retention_days", v)?;
            }
            if let Some(v) = section.get("sweep_on_start") {
                cache.sweep_on_start = parse_bool("cache", "sweep_on_start", v)?;
            }
            if let Some(v) = section.get("on_decode_failure") {
                cache.on_decode_failure = v
                    .parse()
                    .map_err(|reason| invalid("cache", "on_decode_failure", v, reason))?;
            }
        }

        if let Some(section) = ini.section(Some("network")) {
            let network = &mut config.network;
            if let Some(v) = section.get("base_url") {
                network.base_url = v.trim().trim_end_matches('/').to_string();
            }
            if let Some(v) = section.get("request_timeout") {
                network.request_timeout = parse_number("network", "request_timeout", v)?;
            }
            if let Some(v) = section.get("resource_timeout") {
                network.resource_timeout = parse_number("network", "resource_timeout", v)?;
            }
            if let Some(v) = section.get("user_agent") {
                network.user_agent = non_empty(v);
            }
        }

        if let Some(section) = ini.section(Some("settings")) {
            if let Some(v) = section.get("directory") {
                config.settings.directory = expand_tilde(v);
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(v) = section.get("level") {
                config.logging.level = v.trim().to_string();
            }
            if let Some(v) = section.get("directory") {
                config.logging.directory = non_empty(v).map(|d| expand_tilde(&d));
            }
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("cache"))
            .set("name", self.cache.name.as_str())
            .set("directory", self.cache.directory.display().to_string())
            .set("prefix", self.cache.prefix.as_str())
            .set("memory_size", size_value(self.cache.memory_size))
            .set("retention_days", self.cache.retention_days.to_string())
            .set("sweep_on_start", self.cache.sweep_on_start.to_string())
            .set("on_decode_failure", self.cache.on_decode_failure.as_str());

        {
            let mut network = ini.with_section(Some("network"));
            network
                .set("base_url", self.network.base_url.as_str())
                .set("request_timeout", self.network.request_timeout.to_string())
                .set("resource_timeout", self.network.resource_timeout.to_string());
            if let Some(agent) = &self.network.user_agent {
                network.set("user_agent", agent.as_str());
            }
        }

        ini.with_section(Some("settings"))
            .set("directory", self.settings.directory.display().to_string());

        {
            let mut logging = ini.with_section(Some("logging"));
            logging.set("level", self.logging.level.as_str());
            if let Some(dir) = &self.logging.directory {
                logging.set("directory", dir.display().to_string());
            }
        }

        ini
    }

    /// Serialize to INI text.
    pub fn to_ini_string(&self) -> Result<String, ConfigError> {
        let mut buf = Vec::new();
        self.to_ini().write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| ConfigError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// Save to [`config_file_path`], creating `~/.foliocache` if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }
}

fn invalid(section: &'static str, key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_number(section: &'static str, key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "expected a whole number"))
}

fn parse_bool(section: &'static str, key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "expected true or false")),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Expand a leading `~/` to the home directory.
fn expand_tilde(value: &str) -> PathBuf {
    let value = value.trim();
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}

/// Sizes are written in whole megabytes when exact, bytes otherwise.
fn size_value(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else {
        bytes.to_string()
    }
}

impl std::fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[cache]")?;
        writeln!(f, "  name              = {}", self.cache.name)?;
        writeln!(f, "  directory         = {}", self.cache.directory.display())?;
        writeln!(f, "  prefix            = {}", self.cache.prefix)?;
        writeln!(f, "  memory_size       = {}", format_size(self.cache.memory_size))?;
        writeln!(f, "  retention_days    = {}", self.cache.retention_days)?;
        writeln!(f, "  sweep_on_start    = {}", self.cache.sweep_on_start)?;
        writeln!(f, "  on_decode_failure = {}", self.cache.on_decode_failure)?;
        writeln!(f)?;
        writeln!(f, "[network]")?;
        writeln!(f, "  base_url          = {}", self.network.base_url)?;
        writeln!(f, "  request_timeout   = {}s", self.network.request_timeout)?;
        writeln!(f, "  resource_timeout  = {}s", self.network.resource_timeout)?;
        writeln!(
            f,
            "  user_agent        = {}",
            self.network.user_agent.as_deref().unwrap_or("(default)")
        )?;
        writeln!(f)?;
        writeln!(f, "[settings]")?;
        writeln!(f, "  directory         = {}", self.settings.directory.display())?;
        writeln!(f)?;
        writeln!(f, "[logging]")?;
        writeln!(f, "  level             = {}", self.logging.level)?;
        match &self.logging.directory {
            Some(dir) => writeln!(f, "  directory         = {}", dir.display()),
            None => writeln!(f, "  directory         = (stderr only)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_retention_from_days_saturates() {
        assert_eq!(retention_from_days(2), Duration::from_secs(2 * 24 * 60 * 60));
        assert_eq!(retention_from_days(u64::MAX), Duration::from_secs(u64::MAX));

        let config = ConfigFile::parse(&format!("[cache]\nretention_days = {}\n", u64::MAX)).unwrap();
        assert_eq!(config.cache.retention(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("config.ini")).unwrap();

        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.cache.name, "Default");
        assert_eq!(config.cache.prefix, "com.myportfolio.cache.");
        assert_eq!(config.cache.memory_size, 64 * 1024 * 1024);
        assert_eq!(config.cache.retention(), Duration::from_secs(7 * 24 * 60 * 60));
        assert!(!config.cache.sweep_on_start);
        assert_eq!(config.network.base_url, "https://run.mocky.io");
        assert_eq!(config.network.request_timeout, 20);
        assert_eq!(config.network.resource_timeout, 30);
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let config = ConfigFile::parse(
            "[cache]\nname = Portfolio\nmemory_size = 16MB\non_decode_failure = fetch\n\n\
             [network]\nbase_url = http://localhost:8080/\n\n\
             [logging]\nlevel = foliocache=debug\n",
        )
        .unwrap();

        assert_eq!(config.cache.name, "Portfolio");
        assert_eq!(config.cache.memory_size, 16 * 1024 * 1024);
        assert_eq!(config.cache.on_decode_failure, DecodeFailurePolicy::FetchRemote);
        assert_eq!(config.cache.retention_days, 7);
        assert_eq!(config.network.base_url, "http://localhost:8080");
        assert_eq!(config.network.request_timeout, 20);
        assert_eq!(config.logging.level, "foliocache=debug");
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = ConfigFile::parse("[cache]\nretention_days = soon\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                section: "cache",
                key: "retention_days",
                ..
            }
        ));

        let err = ConfigFile::parse("[cache]\nsweep_on_start = maybe\n").unwrap_err();
        assert!(err.to_string().contains("cache.sweep_on_start"));

        let err = ConfigFile::parse("[cache]\nmemory_size = lots\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "memory_size", .. }));

        let err = ConfigFile::parse("[cache]\non_decode_failure = retry\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "on_decode_failure", .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.cache.name = "Portfolio".to_string();
        config.cache.directory = temp.path().join("cache");
        config.cache.sweep_on_start = true;
        config.network.user_agent = Some("tests/1.0".to_string());
        config.logging.directory = Some(temp.path().join("logs"));
        config.save_to(&path).unwrap();

        let reloaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_to_ini_string_contains_sections() {
        let text = ConfigFile::default().to_ini_string().unwrap();
        assert!(text.contains("[cache]"));
        assert!(text.contains("memory_size=64MB"));
        assert!(text.contains("[network]"));
        assert!(text.contains("[logging]"));
    }

    #[test]
    fn test_display_lists_every_section() {
        let shown = ConfigFile::default().to_string();
        assert!(shown.contains("[cache]"));
        assert!(shown.contains("64.0 MB"));
        assert!(shown.contains("(stderr only)"));
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/x"), home.join("x"));
        }
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}
