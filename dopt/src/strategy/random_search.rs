//! Random search reference strategy
//!
//! Maximizes a synthetic objective: the negative squared distance between
//! the parameter vector and a target point. Useful as a registry default
//! and for exercising a full runner loop without an external workload.

use rand::Rng;
use serde::Deserialize;

use async_trait::async_trait;

use crate::model::{Candidate, Parameters};

use super::{DomainMetadata, OptimizationStrategy, StrategyError};

/// Fraction of the search range used when perturbing around the best point
const LOCAL_RADIUS: f64 = 0.1;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RandomSearchOptions {
    dimensions: usize,
    low: f64,
    high: f64,
    target: Option<Vec<f64>>,
}

impl Default for RandomSearchOptions {
    fn default() -> Self {
        Self {
            dimensions: 3,
            low: -1.0,
            high: 1.0,
            target: None,
        }
    }
}

/// Uniform random search over a box, tightening around the current best
#[derive(Debug)]
pub struct RandomSearchStrategy {
    dimensions: usize,
    low: f64,
    high: f64,
    target: Vec<f64>,
}

impl RandomSearchStrategy {
    pub fn new() -> Self {
        let defaults = RandomSearchOptions::default();
        Self {
            dimensions: defaults.dimensions,
            low: defaults.low,
            high: defaults.high,
            target: vec![0.0; defaults.dimensions],
        }
    }

    fn objective(&self, point: &[f64]) -> f64 {
        -point
            .iter()
            .zip(&self.target)
            .map(|(x, t)| (x - t).powi(2))
            .sum::<f64>()
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

impl Default for RandomSearchStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OptimizationStrategy for RandomSearchStrategy {
    fn configure(&mut self, options: &serde_json::Value) -> Result<(), StrategyError> {
        let opts: RandomSearchOptions = serde_json::from_value(options.clone())
            .map_err(|e| StrategyError::Configuration(e.to_string()))?;

        if opts.dimensions == 0 {
            return Err(StrategyError::Configuration(
                "dimensions must be at least 1".to_string(),
            ));
        }
        if opts.low >= opts.high {
            return Err(StrategyError::Configuration(format!(
                "low ({}) must be less than high ({})",
                opts.low, opts.high
            )));
        }

        let target = match opts.target {
            Some(t) if t.len() != opts.dimensions => {
                return Err(StrategyError::Configuration(format!(
                    "target has {} entries but dimensions is {}",
                    t.len(),
                    opts.dimensions
                )));
            }
            Some(t) => t,
            None => vec![0.0; opts.dimensions],
        };

        self.dimensions = opts.dimensions;
        self.low = opts.low;
        self.high = opts.high;
        self.target = target;
        Ok(())
    }

    async fn propose(
        &mut self,
        best_params: Option<&Parameters>,
        _best_performance: Option<f64>,
    ) -> Result<Candidate, StrategyError> {
        let mut rng = rand::rng();

        let point: Vec<f64> = match best_params.and_then(|p| self.point_from_params(p)) {
            // Perturb the current best within a local radius, clamped to bounds
            Some(best) => {
                let radius = LOCAL_RADIUS * (self.high - self.low);
                best.iter()
                    .map(|x| (x + rng.random_range(-radius..=radius)).clamp(self.low, self.high))
                    .collect()
            }
            // No best yet (or foreign-shaped params): sample the whole box
            None => (0..self.dimensions)
                .map(|_| rng.random_range(self.low..=self.high))
                .collect(),
        };

        let performance = self.objective(&point);
        Ok(Candidate::new(Self::params_from_point(&point), performance))
    }

    fn domain_metadata(&self) -> DomainMetadata {
        DomainMetadata {
            higher_is_better: true,
            performance_metric: "neg_squared_distance".to_string(),
        }
    }
}
