//! Synapse - disruption resolution for last-mile delivery operations
//!
//! Turns a free-text description of a delivery disruption into a ranked,
//! ROI-scored action plan, caching results so repeated scenarios are served
//! without recomputation.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use synapse::models::SynapseConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = SynapseConfig::default();
//! let estimator = synapse::build_estimator(&config);
//! let orchestrator = synapse::build_orchestrator(&config, estimator)?;
//! let solution = orchestrator
//!     .resolve("Major accident on Highway 1 affects 5 active deliveries")
//!     .await?;
//! println!("{}", solution.approach);
//! # Ok(())
//! # }
//! ```

pub use synapse_cache as cache;
pub use synapse_engine as engine;
pub use synapse_models as models;
pub use synapse_predictor as predictor;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use synapse_cache::{HotCache, ResultCache, SnapshotStore};
use synapse_engine::llm_cli::LlmCliConfig;
use synapse_engine::{
    CliReasoner, Estimator, KeywordReasoner, Orchestrator, OrchestratorSettings, RandomEstimator,
    Reasoner, SignalHub, SimulatedSignalSource,
};
use synapse_models::{ReasoningBackend, SynapseConfig};
use synapse_predictor::Predictor;

/// Scenarios resolved by `synapse demo`.
pub const DEMO_SCENARIOS: [&str; 3] = [
    "Major accident on Highway 1 affects 5 active deliveries",
    "Customer angry about cold food delivery",
    "Driver reports traffic, but GPS shows clear",
];

/// Load configuration from `path`, or defaults when no path is given.
pub fn load_config(path: Option<&str>) -> Result<SynapseConfig, anyhow::Error> {
    let Some(path) = path else {
        return Ok(SynapseConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {path}"))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config: {path}"))
}

pub fn build_estimator(config: &SynapseConfig) -> Arc<dyn Estimator> {
    Arc::new(RandomEstimator::from_seed_option(config.estimator.seed))
}

pub fn build_reasoner(config: &SynapseConfig) -> Arc<dyn Reasoner> {
    match config.reasoning.backend {
        ReasoningBackend::Local => Arc::new(KeywordReasoner),
        ReasoningBackend::Cli => Arc::new(CliReasoner::new(LlmCliConfig {
            command: config.reasoning.command.clone(),
            model: config.reasoning.model.clone(),
            timeout: Duration::from_secs(config.reasoning.timeout_seconds),
        })),
    }
}

pub fn build_signal_hub(config: &SynapseConfig, estimator: Arc<dyn Estimator>) -> SignalHub {
    if !config.signals.enabled {
        return SignalHub::disabled();
    }
    SignalHub::new(
        SimulatedSignalSource::all(
            estimator,
            Duration::from_millis(config.signals.simulated_latency_ms),
        ),
        HotCache::new(
            config.cache.signal_cache_capacity,
            Duration::from_secs(config.cache.signal_cache_ttl_seconds),
        ),
        Duration::from_millis(config.signals.probe_timeout_ms),
    )
}

/// Build an Orchestrator from configuration, restoring the cache snapshot
/// when one is configured.
pub fn build_orchestrator(
    config: &SynapseConfig,
    estimator: Arc<dyn Estimator>,
) -> Result<Orchestrator, anyhow::Error> {
    let cache = Arc::new(ResultCache::new());
    if let Some(path) = &config.cache.snapshot_path {
        let restored = restore_snapshot(&cache, path)?;
        tracing::info!(path = %path, restored, "Restored cache snapshot");
    }

    Ok(Orchestrator::new(
        Arc::clone(&estimator),
        build_signal_hub(config, estimator),
        build_reasoner(config),
        cache,
        OrchestratorSettings::from_config(config),
    ))
}

pub fn build_predictor(
    config: &SynapseConfig,
    orchestrator: Arc<Orchestrator>,
    estimator: Arc<dyn Estimator>,
) -> Result<Predictor, anyhow::Error> {
    Predictor::new(orchestrator, estimator, config.predictor.clone())
        .context("Invalid predictor configuration")
}

/// Load live entries from the SQLite snapshot at `path` into `cache`.
pub fn restore_snapshot(cache: &ResultCache, path: &str) -> Result<usize, anyhow::Error> {
    let store = SnapshotStore::open(path)
        .with_context(|| format!("Failed to open cache snapshot: {path}"))?;
    let entries = store.load().context("Failed to read cache snapshot")?;
    Ok(cache.restore(entries)?)
}

/// Write every live entry of `cache` to the SQLite snapshot at `path`.
pub fn save_snapshot(cache: &ResultCache, path: &str) -> Result<usize, anyhow::Error> {
    let entries = cache.export_entries()?;
    let mut store = SnapshotStore::open(path)
        .with_context(|| format!("Failed to open cache snapshot: {path}"))?;
    store
        .save(&entries)
        .with_context(|| format!("Failed to write cache snapshot: {path}"))
}
