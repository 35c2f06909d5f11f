//! Strategy error types

use thiserror::Error;

/// Errors surfaced by an optimization strategy
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Invalid strategy options, or an unknown strategy name at bind time.
    /// Fatal to startup.
    #[error("Invalid strategy configuration: {0}")]
    Configuration(String),

    /// The strategy has no candidate to offer this step. Expected and
    /// non-exceptional; the runner treats it as an empty step result.
    #[error("No improvement this step")]
    NoImprovement,

    /// Unexpected strategy failure during proposal. Logged and swallowed by
    /// the runner so a flaky strategy degrades throughput, not availability.
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

impl StrategyError {
    /// Check if this is the expected no-candidate signal
    pub fn is_no_improvement(&self) -> bool {
        matches!(self, StrategyError::NoImprovement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_no_improvement() {
        assert!(StrategyError::NoImprovement.is_no_improvement());
        assert!(!StrategyError::Evaluation("boom".to_string()).is_no_improvement());
        assert!(!StrategyError::Configuration("bad".to_string()).is_no_improvement());
    }
}
