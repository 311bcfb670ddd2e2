//! Report generation and formatting
//!
//! **Purpose:** Console output for a run and JSON export of its results.

use crate::evaluate::Accuracy;
use crate::fusion::Strategy;
use crate::search::{Candidate, SearchOutcome};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Complete record of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Report creation timestamp (RFC 3339)
    pub generated_at: String,

    /// Input data file
    pub input: PathBuf,

    /// Prediction file written
    pub output: PathBuf,

    pub sample_count: usize,

    /// Classes per organ vector
    pub feature_count: usize,

    /// Strategy used for the written predictions
    pub strategy: Strategy,

    /// Accuracy of `strategy`
    pub accuracy: Accuracy,

    /// Search candidates (AUTO mode only, otherwise empty)
    pub candidates: Vec<Candidate>,
}

impl RunReport {
    /// Create a report stamped with the current time
    pub fn new(
        input: PathBuf,
        output: PathBuf,
        feature_count: usize,
        strategy: Strategy,
        accuracy: Accuracy,
        search: Option<&SearchOutcome>,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            input,
            output,
            sample_count: accuracy.total,
            feature_count,
            strategy,
            accuracy,
            candidates: search.map(|s| s.candidates.clone()).unwrap_or_default(),
        }
    }

    /// Export report to JSON file
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Import report from JSON file
    pub fn import_json<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let file = File::open(path)?;
        let report: RunReport = serde_json::from_reader(file)?;
        Ok(report)
    }
}

/// CLI formatter for run results
pub struct CliFormatter;

impl CliFormatter {
    /// One search candidate
    ///
    /// Example: `accuracy = 66.6667%, ratio = 1:2:0`
    pub fn format_candidate(candidate: &Candidate, total: usize) -> String {
        let accuracy = Accuracy::new(candidate.correct, total);
        match candidate.strategy {
            Strategy::Weighted(w) => format!("accuracy = {:.4}%, ratio = {}", accuracy.percent, w),
            Strategy::MaxPool => format!("accuracy = {:.4}%, type = MAX", accuracy.percent),
        }
    }

    /// Number of configurations a search evaluated
    pub fn format_candidate_count(outcome: &SearchOutcome) -> String {
        format!("loop_num = {}", outcome.candidate_count())
    }

    /// Final summary block
    pub fn format_summary(strategy: &Strategy, accuracy: &Accuracy) -> String {
        let mut output = String::new();

        output.push_str("==========================================\n");
        output.push_str(&format!("    AlgoType: {}\n", strategy));
        output.push_str(&format!(
            "    Accuracy: {:.4}% ( {} / {} )\n",
            accuracy.percent, accuracy.correct, accuracy.total
        ));
        output.push_str("==========================================");

        output
    }
}
