//! Ratio search for AUTO mode
//!
//! **Purpose:** Find the fusion configuration with the most correct top-1
//! predictions among weighted ratios inside `[0, max_ratio]^3` and max-pooling.
//!
//! **Algorithm:**
//! 1. Enumerate `(w1, w2, w3)` with `w1` outermost and `w3` innermost
//! 2. Drop triples that are scalar multiples of a canonical one (see
//!    `is_canonical`)
//! 3. Evaluate each surviving triple, then max-pooling once
//! 4. Keep the first configuration with the strictly highest count
//!
//! The skip rules decide which ratios are ever tried, and therefore which
//! winner is reported. Their order and the zero-operand gcd convention must
//! stay exactly as written.

use crate::evaluate::{count_matches, evaluate};
use crate::fusion::{Strategy, Weights};
use crate::table::SampleTable;
use crate::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Greatest common divisor by Euclid's algorithm
///
/// Returns 0 when either operand is 0. The skip rules read 0 as "no
/// reduction applies"; it is never used as a divisor.
pub fn gcd(a: u32, b: u32) -> u32 {
    if a == 0 || b == 0 {
        return 0;
    }
    let (mut a, mut b) = if b > a { (b, a) } else { (a, b) };
    while a % b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    b
}

/// Three-way gcd, `gcd(gcd(a, b), c)`; 0 if any operand is 0
pub fn gcd3(a: u32, b: u32, c: u32) -> u32 {
    if a == 0 || b == 0 || c == 0 {
        return 0;
    }
    gcd(gcd(a, b), c)
}

/// Whether a ratio is the canonical representative of its proportion class
///
/// Rules, applied in order:
/// 1. `0:0:0` is skipped
/// 2. one non-zero weight: only `1` is kept
/// 3. two non-zero weights: kept only if coprime
/// 4. three non-zero weights: kept only if the three-way gcd is 1
pub fn is_canonical(weights: Weights) -> bool {
    let Weights {
        entire: w1,
        leaf: w2,
        flower: w3,
    } = weights;

    if w1 == 0 && w2 == 0 && w3 == 0 {
        return false;
    }

    if w1 == 0 && w2 == 0 && w3 != 1 {
        return false;
    }
    if w1 == 0 && w3 == 0 && w2 != 1 {
        return false;
    }
    if w2 == 0 && w3 == 0 && w1 != 1 {
        return false;
    }

    if w1 == 0 && w2 != 0 && w3 != 0 && gcd(w2, w3) != 1 {
        return false;
    }
    if w2 == 0 && w1 != 0 && w3 != 0 && gcd(w1, w3) != 1 {
        return false;
    }
    if w3 == 0 && w1 != 0 && w2 != 0 && gcd(w1, w2) != 1 {
        return false;
    }

    if w1 != 0 && w2 != 0 && w3 != 0 && gcd3(w1, w2, w3) != 1 {
        return false;
    }

    true
}

/// Canonical ratios within the bound, in enumeration order
pub fn candidate_ratios(max_ratio: u32) -> Vec<Weights> {
    let mut ratios = Vec::new();
    for w1 in 0..=max_ratio {
        for w2 in 0..=max_ratio {
            for w3 in 0..=max_ratio {
                let weights = Weights::new(w1, w2, w3);
                if is_canonical(weights) {
                    ratios.push(weights);
                }
            }
        }
    }
    ratios
}

/// Full evaluation order for a bound: canonical ratios, then max-pooling
pub fn candidate_strategies(max_ratio: u32) -> Vec<Strategy> {
    candidate_ratios(max_ratio)
        .into_iter()
        .map(Strategy::Weighted)
        .chain(std::iter::once(Strategy::MaxPool))
        .collect()
}

/// One evaluated configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub strategy: Strategy,

    /// Correct predictions under this strategy
    pub correct: usize,
}

/// Result of a ratio search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Winning configuration
    pub best: Strategy,

    /// Correct predictions under `best`
    pub best_count: usize,

    /// Every evaluated configuration, in evaluation order
    pub candidates: Vec<Candidate>,
}

impl SearchOutcome {
    /// Number of configurations evaluated
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Pick the winner from candidates in evaluation order
    ///
    /// The first candidate is the initial incumbent; only a strictly higher
    /// count replaces it. `candidates` always ends with max-pooling, so it is
    /// never empty.
    fn from_candidates(candidates: Vec<Candidate>) -> Self {
        let mut best = candidates
            .first()
            .copied()
            .unwrap_or(Candidate {
                strategy: Strategy::MaxPool,
                correct: 0,
            });

        for candidate in candidates.iter().skip(1) {
            if candidate.correct > best.correct {
                best = *candidate;
            }
        }

        Self {
            best: best.strategy,
            best_count: best.correct,
            candidates,
        }
    }
}

/// Sequential ratio search
///
/// Leaves the table holding the scores of the last evaluated configuration
/// (max-pooling); re-evaluate `best` to restore the winner's predictions.
pub fn search(table: &mut SampleTable, max_ratio: u32) -> Result<SearchOutcome> {
    let strategies = candidate_strategies(max_ratio);
    let mut candidates = Vec::with_capacity(strategies.len());

    for strategy in strategies {
        let correct = evaluate(table, &strategy)?;
        debug!("{}: {} / {} correct", strategy, correct, table.len());
        candidates.push(Candidate { strategy, correct });
    }

    Ok(SearchOutcome::from_candidates(candidates))
}

/// Ratio search on the rayon thread pool
///
/// Every worker scores into its own scratch buffer, so the table is only
/// read. Results are collected in enumeration order before the winner is
/// chosen, giving the same outcome as `search`.
pub fn search_parallel(table: &SampleTable, max_ratio: u32) -> Result<SearchOutcome> {
    let strategies = candidate_strategies(max_ratio);

    let candidates = strategies
        .par_iter()
        .map_init(Vec::new, |scratch, strategy| {
            count_matches(table, strategy, scratch).map(|correct| Candidate {
                strategy: *strategy,
                correct,
            })
        })
        .collect::<Result<Vec<Candidate>>>()?;

    for candidate in &candidates {
        debug!(
            "{}: {} / {} correct",
            candidate.strategy,
            candidate.correct,
            table.len()
        );
    }

    Ok(SearchOutcome::from_candidates(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Sample;
    use std::collections::HashSet;

    fn table(rows: Vec<(usize, [Vec<f64>; 3])>) -> SampleTable {
        let feature_count = rows[0].1[0].len();
        let mut table = SampleTable::new(feature_count);
        for (label, scores) in rows {
            table.push(Sample::from_organ_scores(label, scores).unwrap()).unwrap();
        }
        table
    }

    /// Reduce a triple to lowest terms for proportionality checks
    fn reduced(w: Weights) -> [u32; 3] {
        fn full_gcd(a: u32, b: u32) -> u32 {
            if b == 0 {
                a
            } else {
                full_gcd(b, a % b)
            }
        }
        let g = full_gcd(full_gcd(w.entire, w.leaf), w.flower);
        [w.entire / g, w.leaf / g, w.flower / g]
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(18, 12), 6);
        assert_eq!(gcd(7, 5), 1);
        assert_eq!(gcd(4, 4), 4);
        assert_eq!(gcd(1, 9), 1);
    }

    #[test]
    fn test_gcd_zero_sentinel() {
        assert_eq!(gcd(0, 5), 0);
        assert_eq!(gcd(5, 0), 0);
        assert_eq!(gcd(0, 0), 0);
        assert_eq!(gcd3(2, 4, 0), 0);
        assert_eq!(gcd3(0, 3, 3), 0);
    }

    #[test]
    fn test_gcd3() {
        assert_eq!(gcd3(2, 4, 6), 2);
        assert_eq!(gcd3(2, 4, 5), 1);
        assert_eq!(gcd3(3, 3, 3), 3);
    }

    #[test]
    fn test_skip_rules() {
        assert!(!is_canonical(Weights::new(0, 0, 0)));

        assert!(is_canonical(Weights::new(1, 0, 0)));
        assert!(is_canonical(Weights::new(0, 1, 0)));
        assert!(is_canonical(Weights::new(0, 0, 1)));
        assert!(!is_canonical(Weights::new(2, 0, 0)));
        assert!(!is_canonical(Weights::new(0, 0, 5)));

        assert!(is_canonical(Weights::new(1, 2, 0)));
        assert!(!is_canonical(Weights::new(2, 4, 0)));
        assert!(is_canonical(Weights::new(0, 3, 2)));
        assert!(!is_canonical(Weights::new(3, 0, 3)));

        assert!(is_canonical(Weights::new(1, 1, 1)));
        assert!(is_canonical(Weights::new(2, 2, 3)));
        assert!(!is_canonical(Weights::new(2, 2, 2)));
        assert!(!is_canonical(Weights::new(2, 4, 4)));
    }

    #[test]
    fn test_candidates_bound_one() {
        let ratios = candidate_ratios(1);
        let expected = vec![
            Weights::new(0, 0, 1),
            Weights::new(0, 1, 0),
            Weights::new(0, 1, 1),
            Weights::new(1, 0, 0),
            Weights::new(1, 0, 1),
            Weights::new(1, 1, 0),
            Weights::new(1, 1, 1),
        ];
        assert_eq!(ratios, expected);
    }

    #[test]
    fn test_candidate_counts() {
        assert_eq!(candidate_ratios(0).len(), 0);
        assert_eq!(candidate_ratios(2).len(), 19);
        assert_eq!(candidate_ratios(3).len(), 49);
        // 3 singles + 3 * 19 coprime pairs + 115 coprime triples
        assert_eq!(candidate_ratios(5).len(), 175);
    }

    #[test]
    fn test_candidates_never_proportional() {
        let ratios = candidate_ratios(6);
        let mut seen = HashSet::new();
        for w in &ratios {
            assert!(seen.insert(reduced(*w)), "{} duplicates an earlier ratio", w);
        }
    }

    #[test]
    fn test_candidates_cover_every_proportion() {
        let ratios: HashSet<[u32; 3]> = candidate_ratios(4).into_iter().map(reduced).collect();
        for w1 in 0..=4 {
            for w2 in 0..=4 {
                for w3 in 0..=4 {
                    if w1 + w2 + w3 == 0 {
                        continue;
                    }
                    assert!(ratios.contains(&reduced(Weights::new(w1, w2, w3))));
                }
            }
        }
    }

    #[test]
    fn test_zero_bound_evaluates_only_max_pool() {
        let mut t = table(vec![(0, [vec![1.0, 0.0], vec![0.0, 0.0], vec![0.0, 0.0]])]);
        let outcome = search(&mut t, 0).unwrap();

        assert_eq!(outcome.candidate_count(), 1);
        assert_eq!(outcome.candidates[0].strategy, Strategy::MaxPool);
        assert_eq!(outcome.best, Strategy::MaxPool);
        assert_eq!(outcome.best_count, 1);
    }

    #[test]
    fn test_first_seen_wins_ties() {
        // Every configuration predicts class 0 correctly
        let mut t = table(vec![(0, [vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]])]);
        let outcome = search(&mut t, 2).unwrap();

        assert_eq!(outcome.best, Strategy::Weighted(Weights::new(0, 0, 1)));
        assert_eq!(outcome.best_count, 1);
        assert_eq!(outcome.candidate_count(), 20);
    }

    #[test]
    fn test_picks_leaf_heavy_ratio() {
        // Leaf channel is right, the others are wrong but confident on sample 0
        let mut t = table(vec![
            (1, [vec![0.9, 0.1], vec![0.2, 0.8], vec![0.6, 0.4]]),
            (0, [vec![0.4, 0.6], vec![0.7, 0.3], vec![0.45, 0.55]]),
        ]);
        let outcome = search(&mut t, 3).unwrap();

        assert_eq!(outcome.best_count, 2);
        // Earliest ratio scoring both samples correctly
        assert_eq!(outcome.best, Strategy::Weighted(Weights::new(0, 1, 0)));
    }

    #[test]
    fn test_max_pool_wins_when_strictly_better() {
        // Each sample has one organ confident in the right class; averaging
        // dilutes it below the other organs' moderate agreement.
        let mut t = table(vec![
            (0, [vec![0.95, 0.0, 0.0], vec![0.0, 0.5, 0.0], vec![0.0, 0.5, 0.0]]),
            (1, [vec![0.0, 0.0, 0.5], vec![0.0, 0.95, 0.0], vec![0.0, 0.0, 0.5]]),
            (2, [vec![0.5, 0.0, 0.0], vec![0.5, 0.0, 0.0], vec![0.0, 0.0, 0.95]]),
        ]);
        let outcome = search(&mut t, 2).unwrap();

        assert_eq!(outcome.best, Strategy::MaxPool);
        assert_eq!(outcome.best_count, 3);
        for candidate in &outcome.candidates {
            if candidate.strategy != Strategy::MaxPool {
                assert!(candidate.correct < 3, "{} ties max-pool", candidate.strategy);
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows = vec![
            (2, [vec![0.1, 0.3, 0.6], vec![0.5, 0.4, 0.1], vec![0.2, 0.2, 0.6]]),
            (0, [vec![0.7, 0.2, 0.1], vec![0.3, 0.6, 0.1], vec![0.4, 0.5, 0.1]]),
            (1, [vec![0.2, 0.5, 0.3], vec![0.1, 0.1, 0.8], vec![0.3, 0.4, 0.3]]),
            (1, [vec![0.4, 0.4, 0.2], vec![0.2, 0.7, 0.1], vec![0.6, 0.3, 0.1]]),
        ];
        let mut sequential_table = table(rows.clone());
        let parallel_table = table(rows);

        let sequential = search(&mut sequential_table, 4).unwrap();
        let parallel = search_parallel(&parallel_table, 4).unwrap();

        assert_eq!(sequential, parallel);
    }
}
