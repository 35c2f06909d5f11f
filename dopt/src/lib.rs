//! DON Optimizer - one participant in a distributed optimization network
//!
//! A long-running process that repeatedly proposes candidate parameter sets
//! for a named optimization domain, compares each candidate against the
//! best result it has seen so far, and announces genuine improvements to a
//! coordinating node over HTTP.
//!
//! # Core Concepts
//!
//! - **Strict Improvement Only**: a candidate is accepted iff it strictly
//!   beats the current best in the domain's declared direction
//! - **Local State Is Authoritative**: a failed announcement never rolls
//!   back the local best; the next proposal always builds on local state
//! - **Sequential Steps**: exactly one step executes at a time, so the
//!   runner needs no locks
//! - **Faults Degrade, Never Kill**: a flaky strategy or unreachable node
//!   reduces the improvement rate but never terminates the loop
//!
//! # Modules
//!
//! - [`strategy`] - pluggable optimization strategy trait and registry
//! - [`tracker`] - improvement detection over the current best pair
//! - [`runner`] - the step/submit control loop and its lifecycle
//! - [`protocol`] - wire messages and the node HTTP client
//! - [`identity`] - stable peer identifier
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod identity;
pub mod model;
pub mod protocol;
pub mod runner;
pub mod strategy;
pub mod tracker;

// Re-export commonly used types
pub use config::OptimizerConfig;
pub use identity::{IdentityError, PeerIdentity};
pub use model::{Candidate, Optimae, Parameters};
pub use protocol::{Message, MessageType, NodeClient, OptimaeAnnouncement, SubmissionError};
pub use runner::{OptimizationRunner, RunnerError, RunnerState, RunnerStats};
pub use strategy::{
    DomainMetadata, HillClimbStrategy, OptimizationStrategy, RandomSearchStrategy, StrategyError, create_strategy,
};
pub use tracker::{BestResult, ImprovementTracker};
