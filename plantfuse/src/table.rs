//! In-memory sample table
//!
//! Each sample carries one score vector per organ plus scratch space for the
//! fused scores. All vectors in a table have the same length, fixed when the
//! table is created.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Organ channel a score vector was produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Organ {
    /// Whole-plant photograph
    Entire,
    Leaf,
    Flower,
}

impl Organ {
    /// All organs in channel order
    pub const ALL: [Organ; 3] = [Organ::Entire, Organ::Leaf, Organ::Flower];

    /// Position of this organ's channel (0, 1, 2)
    pub fn channel(self) -> usize {
        match self {
            Organ::Entire => 0,
            Organ::Leaf => 1,
            Organ::Flower => 2,
        }
    }

    /// Organ for a channel position
    pub fn from_channel(channel: usize) -> Option<Organ> {
        Organ::ALL.get(channel).copied()
    }
}

impl fmt::Display for Organ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Organ::Entire => write!(f, "entire"),
            Organ::Leaf => write!(f, "leaf"),
            Organ::Flower => write!(f, "flower"),
        }
    }
}

/// Per-organ score vectors, indexed by `Organ::channel()`
pub type OrganScores = [Vec<f64>; 3];

/// One input row
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Ground-truth class index
    pub label: usize,

    /// Class index from the most recent evaluation
    pub predicted: usize,

    organ_scores: OrganScores,
    final_scores: Vec<f64>,
}

impl Sample {
    /// Create a sample with all organ scores zero
    pub fn new(label: usize, feature_count: usize) -> Self {
        Self {
            label,
            predicted: 0,
            organ_scores: [
                vec![0.0; feature_count],
                vec![0.0; feature_count],
                vec![0.0; feature_count],
            ],
            final_scores: vec![0.0; feature_count],
        }
    }

    /// Create a sample from complete organ vectors
    ///
    /// Fails if the three vectors differ in length.
    pub fn from_organ_scores(label: usize, organ_scores: OrganScores) -> Result<Self> {
        let feature_count = organ_scores[0].len();
        if organ_scores.iter().any(|v| v.len() != feature_count) {
            return Err(Error::MalformedInput(format!(
                "Organ score vectors differ in length ({}, {}, {})",
                organ_scores[0].len(),
                organ_scores[1].len(),
                organ_scores[2].len()
            )));
        }

        Ok(Self {
            label,
            predicted: 0,
            organ_scores,
            final_scores: vec![0.0; feature_count],
        })
    }

    /// Number of class indices
    pub fn feature_count(&self) -> usize {
        self.final_scores.len()
    }

    /// Score vector for one organ
    pub fn organ_scores(&self, organ: Organ) -> &[f64] {
        &self.organ_scores[organ.channel()]
    }

    /// All three organ vectors
    pub fn all_organ_scores(&self) -> &OrganScores {
        &self.organ_scores
    }

    /// Fused scores from the most recent evaluation
    pub fn final_scores(&self) -> &[f64] {
        &self.final_scores
    }

    /// Set one organ score during ingestion
    pub(crate) fn set_organ_score(&mut self, organ: Organ, position: usize, value: f64) {
        self.organ_scores[organ.channel()][position] = value;
    }

    /// Split borrow: read-only organ vectors, writable fused scores
    pub(crate) fn scores_mut(&mut self) -> (&OrganScores, &mut [f64]) {
        (&self.organ_scores, &mut self.final_scores)
    }
}

/// All samples of a run, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    feature_count: usize,
    samples: Vec<Sample>,
}

impl SampleTable {
    /// Create an empty table for vectors of `feature_count` entries
    pub fn new(feature_count: usize) -> Self {
        Self {
            feature_count,
            samples: Vec::new(),
        }
    }

    /// Create an empty table with room for `capacity` samples
    pub fn with_capacity(feature_count: usize, capacity: usize) -> Self {
        Self {
            feature_count,
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Append a sample, rejecting vectors of the wrong length
    pub fn push(&mut self, sample: Sample) -> Result<()> {
        if sample.feature_count() != self.feature_count {
            return Err(Error::MalformedInput(format!(
                "Sample has {} features, table expects {}",
                sample.feature_count(),
                self.feature_count
            )));
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Number of class indices per vector
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}

impl<'a> IntoIterator for &'a SampleTable {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
