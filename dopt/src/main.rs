//! dopt - DON optimizer CLI entry point
//!
//! Loads configuration, binds a strategy, and drives the optimization
//! runner; SIGINT/SIGTERM are converted into a graceful stop.

use clap::{CommandFactory, Parser};
use eyre::{Context, Result};
use tracing::{info, warn};

use don_optimizer::cli::{Cli, Command, RunArgs};
use don_optimizer::config::OptimizerConfig;
use don_optimizer::identity::PeerIdentity;
use don_optimizer::runner::{OptimizationRunner, RunnerStats};
use don_optimizer::strategy::STRATEGY_NAMES;

fn setup_logging(log_level: Option<&str>) -> Result<()> {
    let level: tracing::Level = log_level
        .unwrap_or("info")
        .parse()
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    match cli.command {
        Some(Command::Run { opts }) => {
            let config = build_config(cli.config.as_ref(), &opts)?;
            cmd_run(config).await
        }
        Some(Command::Step { opts }) => {
            let config = build_config(cli.config.as_ref(), &opts)?;
            cmd_step(config).await
        }
        Some(Command::Strategies) => cmd_strategies(),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Load the config file chain and apply CLI overrides
fn build_config(config_path: Option<&std::path::PathBuf>, args: &RunArgs) -> Result<OptimizerConfig> {
    let mut config = OptimizerConfig::load(config_path).context("Failed to load configuration")?;

    if let Some(domain_id) = &args.domain_id {
        config.domain_id = domain_id.clone();
    }
    if let Some(strategy) = &args.strategy {
        config.strategy = strategy.clone();
    }
    if let Some(node) = &args.node {
        config.node_endpoint = node.clone();
    }
    if let Some(interval) = args.interval {
        config.step_interval_secs = interval;
    }
    if let Some(max_steps) = args.max_steps {
        config.max_steps = Some(max_steps);
    }
    if let Some(key_file) = &args.key_file {
        config.key_file = Some(key_file.clone());
    }
    if let Some(path) = &args.strategy_config {
        config = config.with_strategy_config_file(path)?;
    }

    config.validate()?;
    Ok(config)
}

/// Failure to load an identity is fatal at startup, not recoverable mid-run
fn load_identity(config: &OptimizerConfig) -> Result<Option<PeerIdentity>> {
    match &config.key_file {
        Some(path) => {
            let identity = PeerIdentity::from_file(path)
                .context(format!("Failed to load identity from {}", path.display()))?;
            Ok(Some(identity))
        }
        None => Ok(None),
    }
}

/// Run the optimization loop until a stop signal or the step bound
async fn cmd_run(config: OptimizerConfig) -> Result<()> {
    let identity = load_identity(&config)?;
    let mut runner = OptimizationRunner::new(config, identity);
    runner.load_strategy().context("Failed to bind strategy")?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    let mut runner_handle = tokio::spawn(async move {
        let result = runner.start(shutdown_rx).await;
        (runner.stats(), result)
    });

    tokio::select! {
        res = &mut runner_handle => {
            let (stats, result) = res?;
            result?;
            log_final_stats(&stats);
            return Ok(());
        }
        res = wait_for_stop_signal() => {
            res?;
        }
    }

    let _ = shutdown_tx.send(()).await;

    let (stats, result) = runner_handle.await?;
    result?;
    log_final_stats(&stats);
    Ok(())
}

/// Bind the strategy, run one step, and print the outcome as JSON
async fn cmd_step(config: OptimizerConfig) -> Result<()> {
    let identity = load_identity(&config)?;
    let mut runner = OptimizationRunner::new(config, identity);
    runner.load_strategy().context("Failed to bind strategy")?;

    match runner.run_single_step().await? {
        Some(optimae) => println!("{}", serde_json::to_string_pretty(&optimae)?),
        None => println!("No improvement"),
    }
    Ok(())
}

/// List the strategy registry
fn cmd_strategies() -> Result<()> {
    for name in STRATEGY_NAMES {
        println!("{name}");
    }
    Ok(())
}

fn log_final_stats(stats: &RunnerStats) {
    info!(
        domain = %stats.domain_id,
        peer = %stats.peer_id,
        steps = stats.steps_completed,
        improvements = stats.improvements_found,
        best = ?stats.best_performance,
        "Run complete"
    );
}

/// Resolve when the process is asked to stop
async fn wait_for_stop_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => warn!("SIGINT received"),
            _ = sigterm.recv() => warn!("SIGTERM received"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        warn!("Ctrl-C received");
    }

    Ok(())
}
