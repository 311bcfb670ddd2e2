//! Run execution
//!
//! Applies a `RunMode` to a loaded table. On return the table holds the
//! predictions of the chosen strategy, ready to be written out.

use crate::evaluate::{evaluate, Accuracy};
use crate::fusion::Strategy;
use crate::mode::RunMode;
use crate::search::{search, search_parallel, SearchOutcome};
use crate::table::SampleTable;
use crate::Result;
use tracing::info;

/// Outcome of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Strategy whose predictions the table now holds
    pub strategy: Strategy,

    /// Accuracy of `strategy` over the table
    pub accuracy: Accuracy,

    /// Search details, in AUTO mode
    pub search: Option<SearchOutcome>,
}

/// Execute a run mode over the table
///
/// `parallel` only affects AUTO mode.
pub fn execute(table: &mut SampleTable, mode: RunMode, parallel: bool) -> Result<Execution> {
    info!("Classifying...");

    let (strategy, search_outcome) = match mode {
        RunMode::Fixed(strategy) => (strategy, None),
        RunMode::Auto { max_ratio } => {
            let outcome = if parallel {
                info!("Searching ratios up to {} on {} threads", max_ratio, rayon::current_num_threads());
                search_parallel(table, max_ratio)?
            } else {
                info!("Searching ratios up to {}", max_ratio);
                search(table, max_ratio)?
            };
            info!(
                "Evaluated {} configurations, best: {} ({} correct)",
                outcome.candidate_count(),
                outcome.best,
                outcome.best_count
            );
            (outcome.best, Some(outcome))
        }
    };

    // Leave the table in the chosen strategy's state
    let correct = evaluate(table, &strategy)?;
    debug_assert!(search_outcome
        .as_ref()
        .map_or(true, |o| o.best_count == correct));

    Ok(Execution {
        strategy,
        accuracy: Accuracy::new(correct, table.len()),
        search: search_outcome,
    })
}
