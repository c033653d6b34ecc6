//! Error types for DishaNav

use thiserror::Error;

/// DishaNav error type
#[derive(Error, Debug)]
pub enum NavError {
    /// Map document failed to parse or validate
    #[error("Malformed map data: {0}")]
    Malformed(String),

    /// Configuration file failed to read or parse
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for NavError {
    fn from(e: serde_json::Error) -> Self {
        NavError::Malformed(e.to_string())
    }
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

/// Crate-local result alias
pub type Result<T> = std::result::Result<T, NavError>;
