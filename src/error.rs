// src/error.rs
use std::io;
use thiserror::Error;

/// Result type used across the detective library
pub type Result<T> = std::result::Result<T, DetectiveError>;

/// Custom Error type for the detective library
#[derive(Error, Debug)]
pub enum DetectiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<config::ConfigError> for DetectiveError {
    fn from(err: config::ConfigError) -> Self {
        DetectiveError::Config(err.to_string())
    }
}
