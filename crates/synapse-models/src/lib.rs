pub mod cache_schema;
pub mod candidate;
pub mod config;
pub mod metrics;
pub mod prediction;
pub mod scenario;
pub mod signal;
pub mod solution;

pub use cache_schema::CacheEntry;
pub use candidate::{Action, ActionKind, Approach, Candidate, EvaluatedCandidate, RoiAnalysis};
pub use config::{
    CacheConfig, EstimatorConfig, PredictorConfig, ReasoningBackend, ReasoningConfig,
    SignalsConfig, SynapseConfig,
};
pub use metrics::{ApproachStats, CacheStatus, OptimizationRecord, OptimizationStats, PerformanceMetrics};
pub use prediction::{PredictedProblem, ProblemType};
pub use scenario::{Scenario, ScenarioType};
pub use signal::{SignalContext, SignalKind, SignalReading, WeatherCondition};
pub use solution::{InteractiveOption, Solution};
