use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use synapse_cache::{CacheInfo, ResultCache};
use synapse_models::cache_schema::key_patterns;
use synapse_models::{
    ApproachStats, CacheStatus, InteractiveOption, OptimizationRecord, OptimizationStats,
    PerformanceMetrics, Scenario, Solution, SynapseConfig,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::{fingerprint, ScenarioClassifier};
use crate::error::EngineError;
use crate::estimator::Estimator;
use crate::evaluator::RoiEvaluator;
use crate::generator::CandidateGenerator;
use crate::metrics::{MetricsAggregator, OptimizationLedger};
use crate::reasoning::{candidate_summary, fallback_options, Reasoner, FALLBACK_EXPLANATION};
use crate::selector::select;
use crate::signals::SignalHub;

/// Tag every cached solution carries besides its scenario type.
pub const SOLUTION_TAG: &str = "solution";

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub solution_ttl_seconds: i64,
    /// Bound on each reasoning call.
    pub reasoning_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            solution_ttl_seconds: 3600,
            reasoning_timeout: Duration::from_secs(10),
        }
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &SynapseConfig) -> Self {
        Self {
            solution_ttl_seconds: config.cache.solution_ttl_seconds,
            reasoning_timeout: Duration::from_secs(config.reasoning.timeout_seconds),
        }
    }
}

/// A freshly computed resolution, before caching and metrics.
#[derive(Debug, Clone)]
pub struct Plan {
    pub scenario: Scenario,
    pub solution: Solution,
}

/// The only entry point of the resolution pipeline.
///
/// Owns the result cache handle, metrics and ledger; probes the cache, runs
/// classify → generate → evaluate → select on a miss, and stores the result.
pub struct Orchestrator {
    classifier: ScenarioClassifier,
    generator: CandidateGenerator,
    evaluator: RoiEvaluator,
    signals: SignalHub,
    reasoner: Arc<dyn Reasoner>,
    cache: Arc<ResultCache>,
    metrics: MetricsAggregator,
    ledger: OptimizationLedger,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        estimator: Arc<dyn Estimator>,
        signals: SignalHub,
        reasoner: Arc<dyn Reasoner>,
        cache: Arc<ResultCache>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            classifier: ScenarioClassifier::new(Arc::clone(&estimator)),
            generator: CandidateGenerator::new(Arc::clone(&estimator)),
            evaluator: RoiEvaluator::new(estimator),
            signals,
            reasoner,
            cache,
            metrics: MetricsAggregator::new(),
            ledger: OptimizationLedger::new(),
            settings,
        }
    }

    /// Resolve free-text disruption into a solution, serving repeats from cache.
    ///
    /// Fails only on empty input. Collaborator and cache failures degrade to
    /// fallback content or an uncached result.
    pub async fn resolve(&self, text: &str) -> Result<Solution, EngineError> {
        let start = Instant::now();
        validate(text)?;

        let key = key_patterns::scenario(&fingerprint(text));

        let probe_start = Instant::now();
        match self.cache.get::<Solution>(&key) {
            Ok(Some(mut cached)) => {
                cached.cache_hit = true;
                cached.execution_time_seconds = probe_start.elapsed().as_secs_f64();
                self.metrics.record(&cached)?;
                info!(
                    scenario_id = %cached.scenario_id,
                    elapsed_ms = probe_start.elapsed().as_millis(),
                    "Served solution from cache"
                );
                return Ok(cached);
            }
            Ok(None) => debug!(key = %key, "Cache miss"),
            Err(e) => warn!(key = %key, error = %e, "Cache probe failed, computing fresh"),
        }

        let Plan { scenario, mut solution } = self.compute(text).await;
        solution.execution_time_seconds = start.elapsed().as_secs_f64();

        let tags = [scenario.scenario_type.as_str(), SOLUTION_TAG];
        if let Err(e) =
            self.cache
                .set_with_tags(&key, &solution, &tags, self.settings.solution_ttl_seconds)
        {
            warn!(key = %key, error = %e, "Failed to cache solution");
        }

        self.metrics.record(&solution)?;
        self.ledger.record(OptimizationRecord {
            timestamp: Utc::now(),
            scenario_id: scenario.id.clone(),
            scenario_type: scenario.scenario_type,
            approach: solution.approach,
            roi_percentage: solution.roi.roi_percentage,
            total_profit: solution.roi.total_profit,
            execution_time_seconds: solution.execution_time_seconds,
            affected_units: scenario.affected_units,
        })?;

        info!(
            scenario_id = %scenario.id,
            scenario_type = %scenario.scenario_type,
            approach = %solution.approach,
            roi = %solution.roi.roi_percentage,
            elapsed_ms = start.elapsed().as_millis(),
            "Resolved scenario"
        );

        Ok(solution)
    }

    /// Run the full computation for `text` without touching the cache, the
    /// metrics or the ledger.
    pub async fn plan(&self, text: &str) -> Result<Plan, EngineError> {
        validate(text)?;
        Ok(self.compute(text).await)
    }

    async fn compute(&self, text: &str) -> Plan {
        let start = Instant::now();

        let classified = self.classifier.scenario(text);
        let signals = self.signals.gather(&classified.id).await;
        let scenario = self.classifier.refine(&classified, &signals);
        debug!(
            scenario_id = %scenario.id,
            scenario_type = %scenario.scenario_type,
            severity = scenario.severity,
            affected_units = scenario.affected_units,
            signals = signals.readings.len(),
            "Classified scenario"
        );

        let candidates = self.generator.generate(&scenario);
        let evaluated = self.evaluator.evaluate_all(candidates, &scenario, &signals);
        let candidates_evaluated = evaluated.len() as u32;
        let winner = select(evaluated);

        let summary = candidate_summary(&scenario, &winner);
        let (reasoning_text, interactive_options) =
            self.reason(&scenario.description, &summary).await;

        let solution = Solution {
            id: Uuid::new_v4(),
            scenario_id: scenario.id.clone(),
            scenario_type: scenario.scenario_type,
            approach: winner.candidate.approach,
            actions: winner.candidate.actions,
            predicted_profit: winner.candidate.base_profit,
            confidence: winner.candidate.confidence,
            roi: winner.roi,
            reasoning_text,
            execution_time_seconds: start.elapsed().as_secs_f64(),
            cache_hit: false,
            interactive_options,
            candidates_evaluated,
            created_at: Utc::now(),
        };

        Plan { scenario, solution }
    }

    /// Explanation and options, each falling back independently.
    async fn reason(&self, text: &str, summary: &str) -> (String, Vec<InteractiveOption>) {
        let timeout = self.settings.reasoning_timeout;
        let timeout_ms = timeout.as_millis() as u64;

        let (explanation, options) = tokio::join!(
            tokio::time::timeout(timeout, self.reasoner.explain(text, summary)),
            tokio::time::timeout(timeout, self.reasoner.suggest_options(text, summary)),
        );

        let explanation = explanation
            .unwrap_or_else(|_| Err(EngineError::Timeout("explanation".to_string(), timeout_ms)))
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(EngineError::Reasoning("empty explanation".to_string()))
                } else {
                    Ok(text)
                }
            });
        let reasoning_text = match explanation {
            Ok(text) => text,
            Err(e) => {
                warn!(reasoner = self.reasoner.name(), error = %e, "Explanation failed, using fallback");
                FALLBACK_EXPLANATION.to_string()
            }
        };

        let options = options
            .unwrap_or_else(|_| Err(EngineError::Timeout("options".to_string(), timeout_ms)))
            .and_then(|options| {
                if (2..=3).contains(&options.len()) {
                    Ok(options)
                } else {
                    Err(EngineError::Reasoning(format!(
                        "expected 2-3 options, got {}",
                        options.len()
                    )))
                }
            });
        let interactive_options = match options {
            Ok(options) => options,
            Err(e) => {
                warn!(reasoner = self.reasoner.name(), error = %e, "Options failed, using fallback");
                fallback_options()
            }
        };

        (reasoning_text, interactive_options)
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn cache_info(&self) -> Result<CacheInfo, EngineError> {
        Ok(self.cache.info()?)
    }

    /// Drop every cached entry. Counters and metrics are kept.
    /// Drop every cached result along with memoized signal readings.
    pub fn clear_cache(&self) -> Result<(), EngineError> {
        self.cache.clear()?;
        self.signals.invalidate();
        info!("Result cache cleared");
        Ok(())
    }

    pub fn metrics(&self) -> Result<PerformanceMetrics, EngineError> {
        self.metrics.snapshot()
    }

    pub fn reset_metrics(&self) -> Result<(), EngineError> {
        self.metrics.reset()
    }

    pub fn cache_status(&self) -> Result<CacheStatus, EngineError> {
        let metrics = self.metrics.snapshot()?;
        Ok(CacheStatus {
            total_cached_solutions: self.cache.keys("scenario:*")?.len(),
            cache_hit_rate: metrics.cache_hit_rate(),
            average_response_time: metrics.average_response_time,
            prediction_accuracy: metrics.accuracy_rate,
        })
    }

    pub fn optimization_stats(&self) -> Result<OptimizationStats, EngineError> {
        self.ledger.stats()
    }

    pub fn optimization_history(&self, limit: usize) -> Result<Vec<OptimizationRecord>, EngineError> {
        self.ledger.history(limit)
    }

    pub fn top_approaches(&self, limit: usize) -> Result<Vec<ApproachStats>, EngineError> {
        self.ledger.top_approaches(limit)
    }
}

fn validate(text: &str) -> Result<(), EngineError> {
    if text.trim().is_empty() {
        return Err(EngineError::InvalidInput(
            "scenario text must not be empty".to_string(),
        ));
    }
    Ok(())
}
