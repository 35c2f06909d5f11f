//! OptimizationStrategy trait definition

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Candidate, Parameters};

use super::StrategyError;

/// Descriptor for the optimization domain a strategy serves.
///
/// Read once when the strategy is bound and cached for the run; a strategy
/// is trusted not to change direction mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainMetadata {
    /// Whether larger performance values are better
    pub higher_is_better: bool,

    /// Name of the metric the performance number measures (e.g. "accuracy")
    pub performance_metric: String,
}

/// Pluggable optimization algorithm - proposes candidate parameter sets
///
/// This is the seam between the runner core and whatever actually searches
/// the parameter space. Each `propose` call receives the runner's view of
/// the current best (both absent on the very first call) and returns a
/// fresh candidate, or signals `NoImprovement` when it has nothing to offer
/// this step.
#[async_trait]
pub trait OptimizationStrategy: Send + Sync + std::fmt::Debug {
    /// Apply a configuration mapping. Called at most once, at bind time.
    fn configure(&mut self, options: &serde_json::Value) -> Result<(), StrategyError>;

    /// Propose a new (parameters, performance) candidate.
    ///
    /// `NoImprovement` is the dedicated no-candidate signal; any other
    /// failure is an evaluation fault.
    async fn propose(
        &mut self,
        best_params: Option<&Parameters>,
        best_performance: Option<f64>,
    ) -> Result<Candidate, StrategyError>;

    /// Describe the domain this strategy optimizes
    fn domain_metadata(&self) -> DomainMetadata;
}
