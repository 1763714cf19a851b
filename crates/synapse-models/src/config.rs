use serde::{Deserialize, Serialize};

/// Top-level configuration for Synapse. Every section and field has a
/// default, so an empty TOML document is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynapseConfig {
    pub cache: CacheConfig,
    pub estimator: EstimatorConfig,
    pub signals: SignalsConfig,
    pub reasoning: ReasoningConfig,
    pub predictor: PredictorConfig,
}

/// Configuration for the result cache and the signal hot cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied to resolved solutions.
    pub solution_ttl_seconds: i64,
    /// Optional SQLite file the result cache is snapshotted to on shutdown
    /// and restored from on startup.
    pub snapshot_path: Option<String>,
    /// Maximum number of entries in the in-memory moka signal cache.
    pub signal_cache_capacity: u64,
    /// How long a probed signal reading is reused.
    pub signal_cache_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            solution_ttl_seconds: 3600,
            snapshot_path: None,
            signal_cache_capacity: 1_000,
            signal_cache_ttl_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Fixed seed for reproducible runs. Entropy-seeded when absent.
    pub seed: Option<u64>,
}

/// Configuration for the environment signal probes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalsConfig {
    pub enabled: bool,
    /// Per-probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
    /// Artificial latency of the simulated probes in milliseconds.
    pub simulated_latency_ms: u64,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probe_timeout_ms: 500,
            simulated_latency_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningBackend {
    /// Offline templated explanations and keyword option sets.
    #[default]
    Local,
    /// Shell out to an LLM command-line tool.
    Cli,
}

/// Configuration for the reasoning collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReasoningConfig {
    pub backend: ReasoningBackend,
    /// Executable invoked by the CLI backend.
    pub command: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            backend: ReasoningBackend::Local,
            command: "claude".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Configuration for the background prediction daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictorConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    /// Problems below this probability are not pre-computed.
    pub probability_threshold: f64,
    pub prediction_ttl_seconds: i64,
    pub max_predictions_per_cycle: usize,
    /// Scenario texts re-planned every cycle so foreground lookups hit.
    pub warm_scenarios: Vec<String>,
    pub cleanup_interval_seconds: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: 60,
            probability_threshold: 0.3,
            prediction_ttl_seconds: 7200,
            max_predictions_per_cycle: 10,
            warm_scenarios: Vec::new(),
            cleanup_interval_seconds: 300,
        }
    }
}
