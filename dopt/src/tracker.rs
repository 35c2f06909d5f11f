//! Improvement detection - decides whether a candidate beats the current best
//!
//! Pure decision logic with no I/O. The tracker owns the runner's current
//! best pair; holding both halves in one `BestResult` makes the
//! both-present-or-both-absent invariant structural.

use crate::model::Parameters;

/// The current best (parameters, performance) pair for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BestResult {
    pub parameters: Parameters,
    pub performance: f64,
}

/// Tracks the best result seen so far and judges new candidates.
///
/// The optimization direction is fixed at construction from the strategy's
/// domain metadata and assumed stable for the run.
#[derive(Debug, Clone)]
pub struct ImprovementTracker {
    higher_is_better: bool,
    best: Option<BestResult>,
}

impl ImprovementTracker {
    /// Create an empty tracker for the given optimization direction
    pub fn new(higher_is_better: bool) -> Self {
        Self {
            higher_is_better,
            best: None,
        }
    }

    /// Current best parameters, if any candidate has been accepted
    pub fn best_params(&self) -> Option<&Parameters> {
        self.best.as_ref().map(|b| &b.parameters)
    }

    /// Current best performance, if any candidate has been accepted
    pub fn best_performance(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.performance)
    }

    /// Whether a candidate with this performance would be accepted
    ///
    /// The first candidate always is (it bootstraps the series). After that,
    /// only a strict improvement in the declared direction counts - equal
    /// performance is never an improvement.
    pub fn is_improvement(&self, performance: f64) -> bool {
        match self.best_performance() {
            None => true,
            Some(best) => {
                if self.higher_is_better {
                    performance > best
                } else {
                    performance < best
                }
            }
        }
    }

    /// Offer a candidate; on acceptance replace the best pair and return the
    /// performance increment, on rejection leave state untouched and return
    /// `None`.
    ///
    /// The replacement is a single assignment, so no caller can observe a
    /// half-updated pair.
    pub fn offer(&mut self, parameters: Parameters, performance: f64) -> Option<f64> {
        if !self.is_improvement(performance) {
            return None;
        }

        let increment = match self.best_performance() {
            Some(previous) => (performance - previous).abs(),
            None => 0.0,
        };

        self.best = Some(BestResult { parameters, performance });
        Some(increment)
    }
}
