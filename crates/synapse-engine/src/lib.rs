pub mod classifier;
pub mod error;
pub mod estimator;
pub mod evaluator;
pub mod generator;
pub mod llm_cli;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod reasoning;
pub mod selector;
pub mod signals;

pub mod test_support;

pub use classifier::{fingerprint, Classification, ScenarioClassifier};
pub use error::EngineError;
pub use estimator::{Estimator, RandomEstimator};
pub use evaluator::RoiEvaluator;
pub use generator::CandidateGenerator;
pub use metrics::{MetricsAggregator, OptimizationLedger};
pub use orchestrator::{Orchestrator, OrchestratorSettings, Plan};
pub use reasoning::{CliReasoner, KeywordReasoner, Reasoner};
pub use selector::select;
pub use signals::{SignalHub, SignalSource, SimulatedSignalSource};
