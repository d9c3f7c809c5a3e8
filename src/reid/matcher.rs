//! Bipartite matching between candidates and switchers.

use ndarray::Array2;
use tracing::debug;

use crate::reid::tracked_object::TrackedObject;

/// Sentinel cost marking a pair as unmatchable inside the assignment solver.
pub const DISALLOWED_MATCH: f64 = 1e6;

/// Cost of pairing a candidate with a switcher; lower means more likely the
/// same real object.
pub type CostFn = Box<dyn Fn(&TrackedObject, &TrackedObject) -> f64 + Send + Sync>;

/// Whether a (candidate, switcher) pair is eligible for matching at all.
pub type SelectionFn = Box<dyn Fn(&TrackedObject, &TrackedObject) -> bool + Send + Sync>;

/// Pairs newly-appeared identities with newly-lost ones by solving a
/// minimum-cost bipartite assignment over user-supplied functions.
pub struct Matcher {
    cost_function: CostFn,
    selection_function: SelectionFn,
    cost_function_threshold: Option<f64>,
}

impl Matcher {
    pub fn new(
        cost_function: CostFn,
        selection_function: SelectionFn,
        cost_function_threshold: Option<f64>,
    ) -> Self {
        Self {
            cost_function,
            selection_function,
            cost_function_threshold,
        }
    }

    /// Cost of every (candidate, switcher) pair; empty if either side is empty.
    pub fn compute_cost_matrix(
        &self,
        candidates: &[&TrackedObject],
        switchers: &[&TrackedObject],
    ) -> Array2<f64> {
        let mut costs = Array2::zeros((candidates.len(), switchers.len()));
        for (i, candidate) in candidates.iter().enumerate() {
            for (j, switcher) in switchers.iter().enumerate() {
                costs[[i, j]] = (self.cost_function)(candidate, switcher);
            }
        }
        costs
    }

    /// Eligibility of every (candidate, switcher) pair; empty if either side
    /// is empty.
    pub fn compute_selection_matrix(
        &self,
        candidates: &[&TrackedObject],
        switchers: &[&TrackedObject],
    ) -> Array2<bool> {
        let mut selection = Array2::from_elem((candidates.len(), switchers.len()), false);
        for (i, candidate) in candidates.iter().enumerate() {
            for (j, switcher) in switchers.iter().enumerate() {
                selection[[i, j]] = (self.selection_function)(candidate, switcher);
            }
        }
        selection
    }

    /// Solve the minimum-cost assignment between candidates and switchers.
    ///
    /// Pairs rejected by the selection function or exceeding the optional
    /// cost threshold are forced to [`DISALLOWED_MATCH`] and never returned.
    /// Each candidate and each switcher appears in at most one of the
    /// returned `(candidate object_id, switcher object_id)` pairs.
    pub fn match_objects(
        &self,
        candidates: &[&TrackedObject],
        switchers: &[&TrackedObject],
    ) -> Vec<(u64, u64)> {
        let num_candidates = candidates.len();
        let num_switchers = switchers.len();
        if num_candidates == 0 || num_switchers == 0 {
            return vec![];
        }

        let mut costs = self.compute_cost_matrix(candidates, switchers);
        let selection = self.compute_selection_matrix(candidates, switchers);
        for i in 0..num_candidates {
            for j in 0..num_switchers {
                if !selection[[i, j]] {
                    costs[[i, j]] = DISALLOWED_MATCH;
                } else if let Some(threshold) = self.cost_function_threshold {
                    if costs[[i, j]] > threshold {
                        costs[[i, j]] = DISALLOWED_MATCH;
                    }
                }
            }
        }

        // lapjv needs a square matrix; padding costs keep padded pairs out
        // of the acceptable range.
        let size = num_candidates.max(num_switchers);
        let mut padded = Array2::<f64>::from_elem((size, size), DISALLOWED_MATCH);
        for i in 0..num_candidates {
            for j in 0..num_switchers {
                padded[[i, j]] = costs[[i, j]];
            }
        }

        let mut matches = vec![];
        match lapjv::lapjv(&padded) {
            Ok((row_to_col, _)) => {
                for (row_idx, &col_idx) in row_to_col.iter().enumerate() {
                    if row_idx >= num_candidates || col_idx >= num_switchers {
                        continue;
                    }
                    if costs[[row_idx, col_idx]] < DISALLOWED_MATCH {
                        matches.push((
                            candidates[row_idx].object_id(),
                            switchers[col_idx].object_id(),
                        ));
                    }
                }
            }
            Err(_) => {
                debug!("assignment solver failed, leaving all pairs unmatched");
            }
        }

        matches
    }
}
