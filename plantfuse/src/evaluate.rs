//! Table-wide evaluation
//!
//! Fuses every sample with one strategy, predicts by argmax and counts
//! correct top-1 predictions.

use crate::fusion::{fuse, fuse_into, Strategy};
use crate::table::SampleTable;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Top-1 prediction over fused scores
///
/// The scan starts from index 0 with a running maximum of 0 and only moves on
/// a strictly greater value, so ties keep the lowest index and a vector with
/// no positive entry predicts 0.
pub fn argmax(scores: &[f64]) -> usize {
    let mut max_index = 0;
    let mut max_value = 0.0;
    for (j, &value) in scores.iter().enumerate() {
        if value > max_value {
            max_index = j;
            max_value = value;
        }
    }
    max_index
}

/// Evaluate one strategy over the whole table
///
/// Overwrites every sample's final scores and prediction and returns the
/// number of samples predicted correctly. Invalid weights are rejected before
/// any sample is modified.
pub fn evaluate(table: &mut SampleTable, strategy: &Strategy) -> Result<usize> {
    strategy.validate()?;

    let mut correct = 0;
    for sample in table.samples_mut() {
        fuse(sample, strategy)?;
        sample.predicted = argmax(sample.final_scores());
        if sample.predicted == sample.label {
            correct += 1;
        }
    }
    Ok(correct)
}

/// Count correct predictions without touching the table
///
/// `scratch` is resized to the table's feature count and reused for every
/// sample; results equal `evaluate` for the same strategy.
pub fn count_matches(table: &SampleTable, strategy: &Strategy, scratch: &mut Vec<f64>) -> Result<usize> {
    strategy.validate()?;
    scratch.clear();
    scratch.resize(table.feature_count(), 0.0);

    let mut correct = 0;
    for sample in table {
        fuse_into(sample.all_organ_scores(), strategy, scratch)?;
        if argmax(scratch) == sample.label {
            correct += 1;
        }
    }
    Ok(correct)
}

/// Accuracy of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    /// Samples predicted correctly
    pub correct: usize,

    /// Samples evaluated
    pub total: usize,

    /// Accuracy as percentage (0-100)
    pub percent: f64,
}

impl Accuracy {
    /// Derive the percentage from counts; an empty table scores 0%
    pub fn new(correct: usize, total: usize) -> Self {
        let percent = if total > 0 {
            (correct as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self {
            correct,
            total,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::Weights;
    use crate::table::Sample;
    use crate::Error;

    fn table(rows: Vec<(usize, [Vec<f64>; 3])>) -> SampleTable {
        let feature_count = rows[0].1[0].len();
        let mut table = SampleTable::new(feature_count);
        for (label, scores) in rows {
            table.push(Sample::from_organ_scores(label, scores).unwrap()).unwrap();
        }
        table
    }

    #[test]
    fn test_argmax_first_maximum_wins() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5, 0.1]), 1);
        assert_eq!(argmax(&[0.3, 0.3, 0.3]), 0);
        assert_eq!(argmax(&[0.0, 0.0, 0.9]), 2);
    }

    #[test]
    fn test_argmax_non_positive_defaults_to_zero() {
        assert_eq!(argmax(&[-0.2, -0.1, -0.5]), 0);
        assert_eq!(argmax(&[0.0, 0.0]), 0);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_evaluate_counts_matches_and_sets_predictions() {
        let mut t = table(vec![
            (0, [vec![0.9, 0.1], vec![0.8, 0.2], vec![0.7, 0.3]]),
            (1, [vec![0.9, 0.1], vec![0.1, 0.9], vec![0.1, 0.9]]),
            (1, [vec![0.6, 0.4], vec![0.6, 0.4], vec![0.6, 0.4]]),
        ]);

        let correct = evaluate(&mut t, &Strategy::Weighted(Weights::uniform())).unwrap();
        assert_eq!(correct, 2);

        let predicted: Vec<usize> = t.iter().map(|s| s.predicted).collect();
        assert_eq!(predicted, vec![0, 1, 0]);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let mut t = table(vec![
            (2, [vec![0.1, 0.2, 0.7], vec![0.3, 0.3, 0.4], vec![0.5, 0.4, 0.1]]),
            (0, [vec![0.5, 0.2, 0.3], vec![0.0, 0.9, 0.1], vec![0.2, 0.2, 0.6]]),
        ]);
        let strategy = Strategy::Weighted(Weights::new(2, 1, 3));

        let first = evaluate(&mut t, &strategy).unwrap();
        let snapshot = t.clone();
        let second = evaluate(&mut t, &strategy).unwrap();

        assert_eq!(first, second);
        assert_eq!(t, snapshot);
    }

    #[test]
    fn test_invalid_weights_abort_without_changes() {
        let mut t = table(vec![(0, [vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]])]);
        evaluate(&mut t, &Strategy::MaxPool).unwrap();
        let before = t.clone();

        let err = evaluate(&mut t, &Strategy::Weighted(Weights::new(0, 0, 0))).unwrap_err();
        assert!(matches!(err, Error::InvalidWeights(_)));
        assert_eq!(t, before);
    }

    #[test]
    fn test_count_matches_agrees_with_evaluate() {
        let mut t = table(vec![
            (1, [vec![0.2, 0.8], vec![0.6, 0.4], vec![0.1, 0.9]]),
            (0, [vec![0.7, 0.3], vec![0.4, 0.6], vec![0.5, 0.5]]),
            (0, [vec![-0.1, -0.2], vec![0.0, 0.0], vec![-0.3, 0.0]]),
        ]);
        let mut scratch = Vec::new();

        for strategy in [
            Strategy::MaxPool,
            Strategy::Weighted(Weights::new(0, 1, 0)),
            Strategy::Weighted(Weights::new(1, 2, 3)),
        ] {
            let pure = count_matches(&t, &strategy, &mut scratch).unwrap();
            let mutating = evaluate(&mut t, &strategy).unwrap();
            assert_eq!(pure, mutating, "{}", strategy);
        }
    }

    #[test]
    fn test_accuracy_percent() {
        let acc = Accuracy::new(3, 4);
        assert_eq!(acc.correct, 3);
        assert_eq!(acc.total, 4);
        assert!((acc.percent - 75.0).abs() < 1e-9);

        assert_eq!(Accuracy::new(0, 0).percent, 0.0);
    }
}
