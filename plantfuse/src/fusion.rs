//! Fusion engine
//!
//! **Purpose:** Turn a sample's three organ score vectors into one fused
//! score per class index.
//!
//! **Algorithms:**
//! - Weighted: per-index weighted mean of the organ scores
//! - Max-pool: per-index maximum across organs (floored at 0), normalized so
//!   the vector sums to 1

use crate::table::{OrganScores, Sample};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer organ weights for weighted fusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Weights {
    pub entire: u32,
    pub leaf: u32,
    pub flower: u32,
}

impl Weights {
    pub const fn new(entire: u32, leaf: u32, flower: u32) -> Self {
        Self {
            entire,
            leaf,
            flower,
        }
    }

    /// Equal weighting of all organs (1:1:1)
    pub const fn uniform() -> Self {
        Self::new(1, 1, 1)
    }

    /// Weights in channel order
    pub fn as_array(&self) -> [u32; 3] {
        [self.entire, self.leaf, self.flower]
    }

    /// Sum of the three weights
    pub fn total(&self) -> u64 {
        self.entire as u64 + self.leaf as u64 + self.flower as u64
    }

    /// Fail unless the weights can be normalized
    pub fn validate(&self) -> Result<()> {
        if self.total() == 0 {
            return Err(Error::InvalidWeights(format!(
                "weights {} sum to zero",
                self
            )));
        }
        Ok(())
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::uniform()
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.entire, self.leaf, self.flower)
    }
}

impl FromStr for Weights {
    type Err = Error;

    /// Parse `w1:w2:w3` (three non-negative integers, no empty parts)
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            Error::InvalidConfiguration(format!(
                "Invalid ratio format '{}' (expected w1:w2:w3)",
                s
            ))
        };

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut values = [0u32; 3];
        for (value, part) in values.iter_mut().zip(&parts) {
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *value = part.parse().map_err(|_| invalid())?;
        }

        Ok(Weights::new(values[0], values[1], values[2]))
    }
}

/// Complete fusion configuration: algorithm plus its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum Strategy {
    Weighted(Weights),
    MaxPool,
}

impl Strategy {
    /// Check parameters before touching any sample
    pub fn validate(&self) -> Result<()> {
        match self {
            Strategy::Weighted(w) => w.validate(),
            Strategy::MaxPool => Ok(()),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Weighted(w) => write!(f, "WEIGHT - {}", w),
            Strategy::MaxPool => write!(f, "MAX"),
        }
    }
}

/// Fuse one sample in place, overwriting its final scores
pub fn fuse(sample: &mut Sample, strategy: &Strategy) -> Result<()> {
    let (organ_scores, final_scores) = sample.scores_mut();
    fuse_into(organ_scores, strategy, final_scores)
}

/// Fuse organ vectors into a caller-provided buffer
///
/// `out` must be as long as each organ vector.
pub fn fuse_into(organ_scores: &OrganScores, strategy: &Strategy, out: &mut [f64]) -> Result<()> {
    debug_assert!(organ_scores.iter().all(|v| v.len() == out.len()));

    match strategy {
        Strategy::Weighted(weights) => {
            weights.validate()?;
            weighted(organ_scores, weights, out);
        }
        Strategy::MaxPool => max_pool(organ_scores, out),
    }
    Ok(())
}

fn weighted(organ_scores: &OrganScores, weights: &Weights, out: &mut [f64]) {
    let [we, wl, wf] = weights.as_array().map(f64::from);
    let total = weights.total() as f64;
    let [entire, leaf, flower] = organ_scores;

    for (j, slot) in out.iter_mut().enumerate() {
        *slot = (entire[j] * we + leaf[j] * wl + flower[j] * wf) / total;
    }
}

fn max_pool(organ_scores: &OrganScores, out: &mut [f64]) {
    let [entire, leaf, flower] = organ_scores;

    let mut sum = 0.0;
    for (j, slot) in out.iter_mut().enumerate() {
        // Negative organ scores never contribute
        let mut value = 0.0;
        for score in [entire[j], leaf[j], flower[j]] {
            if score > value {
                value = score;
            }
        }
        *slot = value;
        sum += value;
    }

    // Degenerate sample: everything is already 0
    if sum > 0.0 {
        for slot in out.iter_mut() {
            *slot /= sum;
        }
    }
}
