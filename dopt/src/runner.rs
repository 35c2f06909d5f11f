//! Optimization runner - binds a strategy and drives the step/submit loop
//!
//! One runner owns one domain's optimization loop: propose a candidate,
//! judge it against the local best, and announce genuine improvements to
//! the configured node. Steps are strictly sequential; the cancellable
//! sleep between steps is the only suspension point, so no locking is
//! needed anywhere in the runner state.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::OptimizerConfig;
use crate::identity::PeerIdentity;
use crate::model::Optimae;
use crate::protocol::{NodeClient, SubmissionError};
use crate::strategy::{self, OptimizationStrategy, StrategyError};
use crate::tracker::ImprovementTracker;

/// Per-request timeout for the network session
const SESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from driving the runner
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The loop was driven before a strategy was bound. Fatal to the call,
    /// not to the process.
    #[error("No strategy bound - call load_strategy() or set_strategy() first")]
    NotReady,

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Lifecycle state of the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerState {
    /// Constructed, no strategy bound yet
    Idle,
    /// Strategy bound, loop not started
    Ready,
    /// Loop active
    Running,
    /// Loop exited, session released. Terminal.
    Stopped,
}

/// Point-in-time snapshot of runner statistics
#[derive(Debug, Clone, Serialize)]
pub struct RunnerStats {
    pub domain_id: String,
    pub peer_id: String,
    pub steps_completed: u64,
    pub improvements_found: u64,
    pub best_performance: Option<f64>,
    pub state: RunnerState,
}

/// Runs the optimization loop for a single domain
///
/// All mutable state (tracker, counters, session) has a single owner and is
/// only touched between suspension points, so a `stop` signal arriving
/// mid-step cannot observe or cause a partial update - it is consumed by
/// the select at the end of the in-flight cycle.
pub struct OptimizationRunner {
    config: OptimizerConfig,
    identity: PeerIdentity,
    strategy: Option<Box<dyn OptimizationStrategy>>,
    tracker: Option<ImprovementTracker>,
    client: Option<NodeClient>,
    state: RunnerState,
    steps_completed: u64,
    improvements_found: u64,
}

impl OptimizationRunner {
    /// Create an idle runner; an absent identity is generated ad hoc
    pub fn new(config: OptimizerConfig, identity: Option<PeerIdentity>) -> Self {
        Self {
            config,
            identity: identity.unwrap_or_else(PeerIdentity::generate),
            strategy: None,
            tracker: None,
            client: None,
            state: RunnerState::Idle,
            steps_completed: 0,
            improvements_found: 0,
        }
    }

    pub fn peer_id(&self) -> &str {
        self.identity.peer_id()
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Bind the strategy named in the configuration via the registry and
    /// apply its options. Idle -> Ready.
    pub fn load_strategy(&mut self) -> Result<(), RunnerError> {
        let mut strategy = strategy::create_strategy(&self.config.strategy)?;
        strategy.configure(&self.config.strategy_config)?;
        info!(
            strategy = %self.config.strategy,
            domain = %self.config.domain_id,
            "Loaded optimization strategy"
        );
        self.bind(strategy);
        Ok(())
    }

    /// Directly bind an already configured strategy (testing or manual
    /// setup). Idle -> Ready.
    pub fn set_strategy(&mut self, strategy: Box<dyn OptimizationStrategy>) {
        self.bind(strategy);
    }

    fn bind(&mut self, strategy: Box<dyn OptimizationStrategy>) {
        // Direction is read once here and cached for the run
        let metadata = strategy.domain_metadata();
        debug!(
            higher_is_better = metadata.higher_is_better,
            metric = %metadata.performance_metric,
            "bind: caching domain metadata"
        );
        self.tracker = Some(ImprovementTracker::new(metadata.higher_is_better));
        self.strategy = Some(strategy);
        self.state = RunnerState::Ready;
    }

    /// Run the optimization loop until stopped or the step bound is reached
    ///
    /// The sender half of `shutdown_rx` is the stop primitive: it may be
    /// fired at any time, including mid-sleep, and the loop exits before
    /// the next step begins. The network session is opened here and
    /// released exactly once on the way out.
    pub async fn start(&mut self, mut shutdown_rx: mpsc::Receiver<()>) -> Result<(), RunnerError> {
        if self.strategy.is_none() {
            return Err(RunnerError::NotReady);
        }

        self.client = Some(NodeClient::connect(
            self.config.node_endpoint.clone(),
            SESSION_TIMEOUT,
        )?);
        self.state = RunnerState::Running;

        info!(
            domain = %self.config.domain_id,
            node = %self.config.node_endpoint,
            peer = %self.identity.short_id(),
            "Optimizer starting"
        );

        let interval = Duration::from_secs_f64(self.config.step_interval_secs);

        loop {
            if let Some(max) = self.config.max_steps
                && self.steps_completed >= max
            {
                info!(max_steps = max, "Max steps reached");
                break;
            }

            // Step faults are isolated inside step(); only NotReady can
            // escape, and the bind was checked above.
            let _ = self.step().await;
            self.steps_completed += 1;

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown_rx.recv() => {
                    info!("Stop requested");
                    break;
                }
            }
        }

        // Session is released exactly once, on every exit path
        self.client = None;
        self.state = RunnerState::Stopped;

        info!(
            steps = self.steps_completed,
            improvements = self.improvements_found,
            "Optimizer stopped"
        );
        Ok(())
    }

    /// Run exactly one step outside the loop (testing/manual use)
    ///
    /// Usable from Ready or Running; does not advance the loop counter.
    pub async fn run_single_step(&mut self) -> Result<Option<Optimae>, RunnerError> {
        self.step().await
    }

    /// Execute one step: propose, judge, and on acceptance record + submit
    async fn step(&mut self) -> Result<Option<Optimae>, RunnerError> {
        let (Some(strategy), Some(tracker)) = (self.strategy.as_mut(), self.tracker.as_mut()) else {
            return Err(RunnerError::NotReady);
        };

        let candidate = match strategy
            .propose(tracker.best_params(), tracker.best_performance())
            .await
        {
            Ok(candidate) => candidate,
            Err(e) if e.is_no_improvement() => {
                debug!("step: strategy reported no improvement");
                return Ok(None);
            }
            // A failing strategy must not crash the loop; it degrades the
            // improvement rate only
            Err(e) => {
                warn!(domain = %self.config.domain_id, error = %e, "Optimization step failed");
                return Ok(None);
            }
        };

        let previous_best = tracker.best_performance();
        let Some(increment) = tracker.offer(candidate.parameters.clone(), candidate.performance) else {
            debug!(performance = candidate.performance, "step: candidate rejected");
            return Ok(None);
        };

        let optimae = Optimae::new(
            self.config.domain_id.as_str(),
            self.identity.peer_id(),
            candidate.parameters,
            candidate.performance,
            increment,
        );
        self.improvements_found += 1;

        // The local best is already advanced; a submission failure does not
        // roll it back - local state stays authoritative for the next
        // proposal
        self.submit(&optimae, previous_best).await;

        info!(
            domain = %self.config.domain_id,
            performance = candidate.performance,
            increment,
            step = self.steps_completed,
            "Improvement found"
        );

        Ok(Some(optimae))
    }

    /// Announce an optimae over the open session; failures are logged only
    async fn submit(&self, optimae: &Optimae, previous_best: Option<f64>) {
        let Some(client) = &self.client else {
            debug!("submit: no session, skipping announcement");
            return;
        };

        if let Err(e) = client
            .announce_optimae(optimae, previous_best, self.identity.peer_id())
            .await
        {
            warn!(
                node = %client.endpoint(),
                optimae_id = %optimae.id,
                error = %e,
                "Failed to submit optimae"
            );
        }
    }

    /// Current optimizer statistics
    pub fn stats(&self) -> RunnerStats {
        RunnerStats {
            domain_id: self.config.domain_id.clone(),
            peer_id: self.identity.short_id().to_string(),
            steps_completed: self.steps_completed,
            improvements_found: self.improvements_found,
            best_performance: self.tracker.as_ref().and_then(|t| t.best_performance()),
            state: self.state,
        }
    }
}
