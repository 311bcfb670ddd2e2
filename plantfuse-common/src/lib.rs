//! # plantfuse Common Library
//!
//! Shared code for the plantfuse workspace:
//! - Error type for configuration and bootstrap failures
//! - TOML configuration loading and resolution
//! - Tracing subscriber initialization

pub mod config;
pub mod error;
pub mod logging;

pub use config::{InputConfig, LoggingConfig, SearchConfig, TomlConfig};
pub use error::{Error, Result};
