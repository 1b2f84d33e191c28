//! Error types for secfetch-core

use thiserror::Error;

/// Result type alias using secfetch-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for secfetch
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Two providers configured with the same trigger
    #[error("Duplicate provider trigger '{prefix}' used by {first} and {second}")]
    DuplicatePrefix {
        prefix: String,
        first: &'static str,
        second: &'static str,
    },
}

impl Error {
    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
