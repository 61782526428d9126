//! Configuration file handling.
//!
//! Settings live in `~/.foliocache/config.ini`. A missing file means
//! defaults; a present file only needs the keys it wants to change.
//!
//! ```ini
//! [cache]
//! name = Default
//! memory_size = 64MB
//! retention_days = 7
//! sweep_on_start = false
//! on_decode_failure = empty
//!
//! [network]
//! base_url = https://run.mocky.io
//! request_timeout = 20
//! resource_timeout = 30
//!
//! [settings]
//! directory = ~/.foliocache/settings
//!
//! [logging]
//! level = info
//! ```

mod file;
mod size;

pub use file::{
    config_directory, config_file_path, retention_from_days, CacheSection, ConfigError,
    ConfigFile, LoggingSection, NetworkSection, SettingsSection,
};
pub use size::{format_size, parse_size};
