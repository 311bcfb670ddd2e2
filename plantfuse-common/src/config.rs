//! Configuration loading and resolution
//!
//! A plantfuse run is configured from, in priority order:
//! 1. Command-line arguments (handled by the binary, override everything below)
//! 2. TOML file named by `--config`
//! 3. TOML file named by the `PLANTFUSE_CONFIG` environment variable
//! 4. `<user config dir>/plantfuse/config.toml`
//! 5. Built-in defaults
//!
//! A file requested explicitly (2 or 3) must exist and parse. The default
//! location (4) is optional: when absent the run proceeds on built-in defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "PLANTFUSE_CONFIG";

/// Complete configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Input file format options (optional)
    #[serde(default)]
    pub input: InputConfig,

    /// AUTO mode search options (optional)
    #[serde(default)]
    pub search: SearchConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Input file format options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Field delimiter between label and `index:value` pairs
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

/// Ratio search options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound for each weight in the ratio cube
    #[serde(default = "default_max_ratio")]
    pub max_ratio: u32,

    /// Evaluate candidates on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_ratio: default_max_ratio(),
            parallel: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_delimiter() -> char {
    ' '
}

fn default_max_ratio() -> u32 {
    5
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(Error::Config(format!(
                "Invalid logging.level '{}' (expected one of {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        let delimiter = self.input.delimiter;
        if delimiter == ':' || delimiter == '\n' || delimiter == '\r' || delimiter.is_ascii_digit() {
            return Err(Error::Config(format!(
                "Invalid input.delimiter {:?}",
                delimiter
            )));
        }

        if self.search.max_ratio == 0 {
            return Err(Error::Config(
                "search.max_ratio must be a positive integer".to_string(),
            ));
        }

        Ok(())
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` argument
    CommandLine(PathBuf),
    /// `PLANTFUSE_CONFIG` environment variable
    Environment(PathBuf),
    /// Per-user default location
    UserDefault(PathBuf),
    /// No file; compiled defaults
    BuiltIn,
}

impl ConfigSource {
    /// File path for this source, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(p)
            | ConfigSource::Environment(p)
            | ConfigSource::UserDefault(p) => Some(p),
            ConfigSource::BuiltIn => None,
        }
    }
}

/// Determine which configuration file to use
///
/// The per-user default is only selected when the file exists.
pub fn resolve_config_source(cli_arg: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config file
    if let Some(path) = default_config_path() {
        if path.exists() {
            return ConfigSource::UserDefault(path);
        }
    }

    // Priority 4: Compiled defaults
    ConfigSource::BuiltIn
}

/// Per-user configuration file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("plantfuse").join("config.toml"))
}

/// Load and validate a configuration file
pub fn load_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;
    TomlConfig::from_toml_str(&content)
}

/// Resolve and load the effective configuration
///
/// Nothing is logged here: the logging settings come from this very file.
/// Call `log_source` once tracing is initialized.
pub fn load_resolved(cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let source = resolve_config_source(cli_arg);
    let config = match source.path() {
        Some(path) => load_config(path)?,
        None => TomlConfig::default(),
    };

    Ok((config, source))
}

/// Report where the configuration came from
pub fn log_source(source: &ConfigSource) {
    match source.path() {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => warn!("No configuration file found, using built-in defaults"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.input.delimiter, ' ');
        assert_eq!(config.search.max_ratio, 5);
        assert!(!config.search.parallel);
    }

    #[test]
    fn test_partial_sections() {
        let config = TomlConfig::from_toml_str(
            r#"
            [search]
            max_ratio = 8

            [input]
            delimiter = "\t"
            "#,
        )
        .unwrap();

        assert_eq!(config.search.max_ratio, 8);
        assert!(!config.search.parallel);
        assert_eq!(config.input.delimiter, '\t');
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_rejects_zero_max_ratio() {
        let err = TomlConfig::from_toml_str("[search]\nmax_ratio = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_colon_delimiter() {
        let err = TomlConfig::from_toml_str("[input]\ndelimiter = \":\"\n").unwrap_err();
        assert!(err.to_string().contains("delimiter"));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let err = TomlConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_rejects_bad_toml() {
        let err = TomlConfig::from_toml_str("[search\nmax_ratio = 3").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_cli_argument_wins() {
        let source = resolve_config_source(Some(Path::new("/tmp/explicit.toml")));
        assert_eq!(
            source,
            ConfigSource::CommandLine(PathBuf::from("/tmp/explicit.toml"))
        );
        assert_eq!(source.path(), Some(Path::new("/tmp/explicit.toml")));
    }
}
