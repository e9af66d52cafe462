use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportReplaceError {
    #[error("importreplace error: {0}")]
    Generic(String),
    #[error(transparent)]
    Expected(#[from] ImportReplaceExpectedError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Errors caused by the user's configuration. These are surfaced at plugin startup, before any
/// import event is handled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportReplaceExpectedError {
    #[error("Invalid pattern {pattern:?} in replacement group {group}: {message}")]
    InvalidPattern { group: usize, pattern: String, message: String },
    #[error("Configuration file not found ({path})")]
    ConfigNotFound { path: PathBuf },
    #[error("Failed to decode configuration file: invalid TOML: {message}")]
    ConfigDecode { message: String },
    #[error("Invalid value for {key} in configuration: {message}")]
    InvalidConfigValue { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, ImportReplaceError>;
