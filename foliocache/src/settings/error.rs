//! Settings store errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The store file could not be written.
    #[error("Settings file could not be written: {0}")]
    FileNotWritten(String),

    /// The store file vanished between read and write.
    #[error("Settings file does not exist")]
    FileDoesNotExist,

    /// The store has not been created, or its file is unreadable.
    #[error("Settings file is unavailable")]
    FileUnavailable,

    #[error("Settings file is already empty")]
    FileAlreadyEmpty,

    #[error("Key already exists: {0}")]
    KeyAlreadyExists(String),

    #[error("Key does not exist: {0}")]
    KeyDoesNotExist(String),
}
