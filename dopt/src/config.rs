//! Optimizer configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_node_endpoint() -> String {
    "localhost:8470".to_string()
}

fn default_step_interval() -> f64 {
    1.0
}

fn default_strategy_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Immutable configuration snapshot for one optimizer run
///
/// Created once at startup (config file merged with CLI flags) and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OptimizerConfig {
    /// Domain to optimize
    pub domain_id: String,

    /// Registry name of the strategy to bind
    pub strategy: String,

    /// Opaque strategy options, passed through to `configure`
    pub strategy_config: serde_json::Value,

    /// Node message endpoint, host:port
    pub node_endpoint: String,

    /// Seconds to sleep between steps
    pub step_interval_secs: f64,

    /// Maximum number of steps; absent = run until stopped
    pub max_steps: Option<u64>,

    /// Key file to derive the peer identity from; absent = generate ad hoc
    pub key_file: Option<PathBuf>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            domain_id: String::new(),
            strategy: String::new(),
            strategy_config: default_strategy_config(),
            node_endpoint: default_node_endpoint(),
            step_interval_secs: default_step_interval(),
            max_steps: None,
            key_file: None,
        }
    }
}

impl OptimizerConfig {
    /// Validate configuration before use
    ///
    /// Call early in startup to fail fast with clear messages.
    pub fn validate(&self) -> Result<()> {
        if self.domain_id.is_empty() {
            return Err(eyre::eyre!("domain-id must not be empty"));
        }
        if self.strategy.is_empty() {
            return Err(eyre::eyre!("strategy must not be empty"));
        }
        if !self.step_interval_secs.is_finite() || self.step_interval_secs < 0.0 {
            return Err(eyre::eyre!(
                "step-interval-secs must be >= 0 (got {})",
                self.step_interval_secs
            ));
        }
        if self.node_endpoint.is_empty() {
            return Err(eyre::eyre!("node-endpoint must not be empty"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    ///
    /// Explicit path, then `.donopt.yml` in the working directory, then
    /// `~/.config/don-optimizer/config.yml`, then defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(".donopt.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("don-optimizer").join("config.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Load strategy options from a JSON file, replacing the inline mapping
    pub fn with_strategy_config_file(mut self, path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).context(format!("Failed to read strategy config from {}", path.display()))?;
        self.strategy_config = serde_json::from_str(&content).context("Failed to parse strategy config JSON")?;
        Ok(self)
    }
}
