//! Optimization strategy seam for the runner
//!
//! Strategies are bound by name through a static registry rather than any
//! dynamic loading: `create_strategy` is a factory match keyed by a string
//! identifier, returning a boxed trait object.

use tracing::debug;

mod error;
mod hill_climb;
mod plugin;
mod random_search;

pub use error::StrategyError;
pub use hill_climb::HillClimbStrategy;
pub use plugin::{DomainMetadata, OptimizationStrategy};
pub use random_search::RandomSearchStrategy;

#[cfg(test)]
pub use plugin::mock;

/// Names accepted by [`create_strategy`], for CLI listings
pub const STRATEGY_NAMES: &[&str] = &["random-search", "hill-climb"];

/// Create an optimization strategy by registry name
///
/// Unknown names are a configuration error, fatal at bind time.
pub fn create_strategy(name: &str) -> Result<Box<dyn OptimizationStrategy>, StrategyError> {
    debug!(strategy = %name, "create_strategy: called");
    match name {
        "random-search" => Ok(Box::new(RandomSearchStrategy::new())),
        "hill-climb" => Ok(Box::new(HillClimbStrategy::new())),
        other => Err(StrategyError::Configuration(format!(
            "Unknown strategy: '{}'. Supported: {}",
            other,
            STRATEGY_NAMES.join(", ")
        ))),
    }
}
