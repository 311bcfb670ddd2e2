//! Run mode selection
//!
//! Turns the raw command-line selectors (`-t`, `-r`, `-m`) into a validated
//! mode. `-r` belongs to WEIGHTED and `-m` to AUTO; either flag given with
//! another type is a configuration error.

use crate::fusion::{Strategy, Weights};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// `-t` value for weighted fusion
pub const TYPE_WEIGHTED: u8 = 0;
/// `-t` value for max-pooling
pub const TYPE_MAX_POOL: u8 = 1;
/// `-t` value for ratio search
pub const TYPE_AUTO: u8 = 2;

/// What a run does with the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Evaluate one fixed strategy
    Fixed(Strategy),
    /// Search ratios up to `max_ratio` plus max-pooling
    Auto { max_ratio: u32 },
}

impl RunMode {
    /// Validate selectors into a run mode
    ///
    /// `default_max_ratio` applies when AUTO is selected without `-m`.
    pub fn from_selectors(
        algorithm_type: u8,
        ratio: Option<&str>,
        max_ratio: Option<i64>,
        default_max_ratio: u32,
    ) -> Result<Self> {
        match algorithm_type {
            TYPE_WEIGHTED => {
                if max_ratio.is_some() {
                    return Err(Error::InvalidConfiguration(
                        "\"-m\" only available in AUTO type".to_string(),
                    ));
                }
                let weights = match ratio {
                    Some(ratio) => ratio.parse::<Weights>()?,
                    None => Weights::default(),
                };
                weights
                    .validate()
                    .map_err(|_| Error::InvalidConfiguration(format!("ratio {} sums to zero", weights)))?;
                Ok(RunMode::Fixed(Strategy::Weighted(weights)))
            }
            TYPE_MAX_POOL => {
                reject_ratio(ratio)?;
                if max_ratio.is_some() {
                    return Err(Error::InvalidConfiguration(
                        "\"-m\" only available in AUTO type".to_string(),
                    ));
                }
                Ok(RunMode::Fixed(Strategy::MaxPool))
            }
            TYPE_AUTO => {
                reject_ratio(ratio)?;
                let max_ratio = match max_ratio {
                    Some(m) if m > 0 && m <= u32::MAX as i64 => m as u32,
                    Some(m) => {
                        return Err(Error::InvalidConfiguration(format!(
                            "Invalid max_ratio {} (must be a positive integer)",
                            m
                        )))
                    }
                    None => default_max_ratio,
                };
                if max_ratio == 0 {
                    return Err(Error::InvalidConfiguration(
                        "Invalid max_ratio 0 (must be a positive integer)".to_string(),
                    ));
                }
                Ok(RunMode::Auto { max_ratio })
            }
            other => Err(Error::InvalidConfiguration(format!(
                "Invalid type {} (expected 0, 1 or 2)",
                other
            ))),
        }
    }
}

fn reject_ratio(ratio: Option<&str>) -> Result<()> {
    if ratio.is_some() {
        return Err(Error::InvalidConfiguration(
            "\"-r\" only available in WEIGHT type".to_string(),
        ));
    }
    Ok(())
}

/// Default prediction file: input basename plus `.out`, in the working directory
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".out");
    PathBuf::from(name)
}
