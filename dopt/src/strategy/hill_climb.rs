//! Hill-climb reference strategy
//!
//! Minimizes the sum of squares of the parameter vector by perturbing one
//! coordinate of the current best per step with a decaying step size.
//! Exists mainly to exercise the lower-is-better direction end to end.

use rand::Rng;
use serde::Deserialize;

use async_trait::async_trait;

use crate::model::{Candidate, Parameters};

use super::{DomainMetadata, OptimizationStrategy, StrategyError};

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HillClimbOptions {
    dimensions: usize,
    init_range: f64,
    step_size: f64,
    decay: f64,
}

impl Default for HillClimbOptions {
    fn default() -> Self {
        Self {
            dimensions: 3,
            init_range: 1.0,
            step_size: 0.5,
            decay: 0.99,
        }
    }
}

/// Single-coordinate hill climber over a sum-of-squares loss
#[derive(Debug)]
pub struct HillClimbStrategy {
    dimensions: usize,
    init_range: f64,
    step_size: f64,
    decay: f64,
}

impl HillClimbStrategy {
    pub fn new() -> Self {
        let defaults = HillClimbOptions::default();
        Self {
            dimensions: defaults.dimensions,
            init_range: defaults.init_range,
            step_size: defaults.step_size,
            decay: defaults.decay,
        }
    }

    fn loss(point: &[f64]) -> f64 {
        point.iter().map(|x| x * x).sum()
    }

    fn point_from_params(&self, params: &Parameters) -> Option<Vec<f64>> {
        (0..self.dimensions)
            .map(|i| params.get(&format!("x{i}")).and_then(|v| v.as_f64()))
            .collect()
    }

    fn params_from_point(point: &[f64]) -> Parameters {
        point
            .iter()
            .enumerate()
            .map(|(i, x)| (format!("x{i}"), serde_json::json!(x)))
            .collect()
    }
}

impl Default for HillClimbStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OptimizationStrategy for HillClimbStrategy {
    fn configure(&mut self, options: &serde_json::Value) -> Result<(), StrategyError> {
        let opts: HillClimbOptions = serde_json::from_value(options.clone())
            .map_err(|e| StrategyError::Configuration(e.to_string()))?;

        if opts.dimensions == 0 {
            return Err(StrategyError::Configuration(
                "dimensions must be at least 1".to_string(),
            ));
        }
        if opts.step_size <= 0.0 {
            return Err(StrategyError::Configuration(
                "step_size must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&opts.decay) || opts.decay == 0.0 {
            return Err(StrategyError::Configuration(
                "decay must be in (0, 1]".to_string(),
            ));
        }

        self.dimensions = opts.dimensions;
        self.init_range = opts.init_range;
        self.step_size = opts.step_size;
        self.decay = opts.decay;
        Ok(())
    }

    async fn propose(
        &mut self,
        best_params: Option<&Parameters>,
        _best_performance: Option<f64>,
    ) -> Result<Candidate, StrategyError> {
        let mut rng = rand::rng();

        let point: Vec<f64> = match best_params.and_then(|p| self.point_from_params(p)) {
            Some(mut best) => {
                let coord = rng.random_range(0..self.dimensions);
                let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                best[coord] += sign * self.step_size;
                self.step_size *= self.decay;
                best
            }
            None => (0..self.dimensions)
                .map(|_| rng.random_range(-self.init_range..=self.init_range))
                .collect(),
        };

        let performance = Self::loss(&point);
        Ok(Candidate::new(Self::params_from_point(&point), performance))
    }

    fn domain_metadata(&self) -> DomainMetadata {
        DomainMetadata {
            higher_is_better: false,
            performance_metric: "sum_of_squares".to_string(),
        }
    }
}
