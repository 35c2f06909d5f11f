//! Core domain records shared across the runner, tracker, and protocol

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque parameter mapping produced by a strategy.
///
/// The keys and values are meaningful only to the strategy and the remote
/// node; the runner never inspects them.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// An ephemeral (parameters, performance) pair returned by one strategy step.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub parameters: Parameters,
    pub performance: f64,
}

impl Candidate {
    pub fn new(parameters: Parameters, performance: f64) -> Self {
        Self { parameters, performance }
    }
}

/// A recorded, accepted improvement for a domain.
///
/// Created exactly once per accepted step and immutable thereafter. The
/// runner hands it to the submission protocol and then discards it; durable
/// storage is the remote node's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Optimae {
    /// Unique identifier assigned at creation
    pub id: Uuid,

    /// Domain this improvement belongs to
    pub domain_id: String,

    /// Peer id of the optimizer that found it
    pub optimizer_id: String,

    /// The improved parameter set
    pub parameters: Parameters,

    /// Performance measured for these parameters
    pub reported_performance: f64,

    /// Absolute difference from the prior best (0 for the first acceptance)
    pub performance_increment: f64,

    /// When the improvement was recorded
    pub created_at: DateTime<Utc>,
}

impl Optimae {
    pub fn new(
        domain_id: impl Into<String>,
        optimizer_id: impl Into<String>,
        parameters: Parameters,
        reported_performance: f64,
        performance_increment: f64,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            domain_id: domain_id.into(),
            optimizer_id: optimizer_id.into(),
            parameters,
            reported_performance,
            performance_increment,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, f64)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
            .collect()
    }

    #[test]
    fn test_optimae_gets_unique_id() {
        let a = Optimae::new("d1", "peer", params(&[("w", 1.0)]), 0.5, 0.0);
        let b = Optimae::new("d1", "peer", params(&[("w", 1.0)]), 0.5, 0.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_optimae_serializes_parameters_as_object() {
        let optimae = Optimae::new("d1", "peer", params(&[("w", 1.0), ("bias", 0.1)]), 0.55, 0.0);
        let value = serde_json::to_value(&optimae).unwrap();

        assert_eq!(value["domain_id"], "d1");
        assert_eq!(value["parameters"]["w"], 1.0);
        assert_eq!(value["parameters"]["bias"], 0.1);
        assert_eq!(value["reported_performance"], 0.55);
    }
}
