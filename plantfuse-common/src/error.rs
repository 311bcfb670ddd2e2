//! Common error types for plantfuse

use thiserror::Error;

/// Common result type for plantfuse bootstrap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration or initializing logging
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML syntax or type error in a configuration file
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
