use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use synapse_engine::classifier::fingerprint;
use synapse_engine::orchestrator::SOLUTION_TAG;
use synapse_engine::signals::simulate_reading;
use synapse_engine::{Estimator, Orchestrator};
use synapse_models::cache_schema::key_patterns;
use synapse_models::{
    PredictedProblem, PredictorConfig, ProblemType, SignalKind, SignalReading, WeatherCondition,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::PredictorError;
use crate::patterns::{
    affected_area, describe, probability, time_factor, weather_factor, ACTIVE_DELIVERIES, CENTRE,
    LOCATION_SPREAD, PATTERNS, PROBABILITY_NOISE,
};

/// Tag carried by every stored prediction besides its problem type.
pub const PREDICTION_TAG: &str = "prediction";

const BASE_ACCURACY: f64 = 0.85;
const MAX_ACCURACY_IMPROVEMENT: f64 = 0.15;
const ACCURACY_STEP: f64 = 0.0001;

pub fn prediction_accuracy(total_predictions: u64) -> f64 {
    BASE_ACCURACY + MAX_ACCURACY_IMPROVEMENT.min(total_predictions as f64 * ACCURACY_STEP)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PredictorStats {
    pub total_predictions: u64,
    /// Live `prediction:*` entries in the result cache.
    pub cached_predictions: usize,
    pub prediction_accuracy: f64,
    pub cycles: u64,
}

/// Outcome of one prediction cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub active_deliveries: u32,
    pub stored: usize,
    pub failed: usize,
    pub warmed: usize,
}

/// A problem above the probability threshold, before its plan is computed.
#[derive(Debug, Clone, PartialEq)]
struct Forecast {
    problem_type: ProblemType,
    probability: f64,
    horizon_minutes: u32,
    affected_area: String,
    affected_deliveries: u32,
    severity: f64,
}

/// Background predictor. Pre-computes plans for likely problems and keeps
/// configured scenarios warm in the result cache.
#[derive(Clone)]
pub struct Predictor {
    orchestrator: Arc<Orchestrator>,
    estimator: Arc<dyn Estimator>,
    config: PredictorConfig,
    total_predictions: Arc<AtomicU64>,
    cycles: Arc<AtomicU64>,
    cancel: CancellationToken,
}

impl Predictor {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        estimator: Arc<dyn Estimator>,
        config: PredictorConfig,
    ) -> Result<Self, PredictorError> {
        if config.interval_seconds == 0 || config.cleanup_interval_seconds == 0 {
            return Err(PredictorError::Config(
                "predictor intervals must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&config.probability_threshold) {
            return Err(PredictorError::Config(format!(
                "probability_threshold must be within [0, 1], got {}",
                config.probability_threshold
            )));
        }

        Ok(Self {
            orchestrator,
            estimator,
            config,
            total_predictions: Arc::new(AtomicU64::new(0)),
            cycles: Arc::new(AtomicU64::new(0)),
            cancel: CancellationToken::new(),
        })
    }

    /// Returns a CancellationToken that can be used to trigger shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Run the prediction and cleanup loops until cancelled.
    pub async fn run(&self) -> Result<(), PredictorError> {
        info!(
            interval_seconds = self.config.interval_seconds,
            warm_scenarios = self.config.warm_scenarios.len(),
            "Predictor starting"
        );

        let mut join_set = tokio::task::JoinSet::new();
        {
            let predictor = self.clone();
            join_set.spawn(async move { predictor.prediction_loop().await });
        }
        {
            let predictor = self.clone();
            join_set.spawn(async move { predictor.cleanup_loop().await });
        }

        while let Some(result) = join_set.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Predictor task panicked");
            }
        }

        info!("Predictor stopped");
        Ok(())
    }

    async fn prediction_loop(&self) {
        let interval = Duration::from_secs(self.config.interval_seconds);

        // first cycle runs immediately
        if !self.cycle_unless_cancelled().await {
            return;
        }

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Prediction loop shutting down");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    if !self.cycle_unless_cancelled().await {
                        break;
                    }
                }
            }
        }
    }

    /// Returns false when cancellation interrupted the cycle.
    async fn cycle_unless_cancelled(&self) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => {
                info!("Prediction cycle interrupted by shutdown");
                false
            }
            report = self.run_cycle() => {
                info!(
                    active_deliveries = report.active_deliveries,
                    stored = report.stored,
                    failed = report.failed,
                    warmed = report.warmed,
                    "Prediction cycle complete"
                );
                true
            }
        }
    }

    async fn cleanup_loop(&self) {
        let interval = Duration::from_secs(self.config.cleanup_interval_seconds);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Cleanup loop shutting down");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    match self.orchestrator.cache().purge_expired() {
                        Ok(purged) if purged > 0 => {
                            info!(purged, "Purged expired cache entries");
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!(error = %e, "Expired entry cleanup failed");
                        }
                    }
                }
            }
        }
    }

    /// One cycle: forecast, pre-compute and store each prediction, then
    /// re-plan the warm scenarios. Individual failures are logged and skipped.
    pub async fn run_cycle(&self) -> CycleReport {
        let now = Utc::now();
        let weather = self.current_weather();
        let (active_deliveries, forecasts) = self.forecast(now.hour(), weather);
        debug!(
            active_deliveries,
            forecasts = forecasts.len(),
            weather = ?weather,
            "Forecast complete"
        );

        let mut report = CycleReport {
            active_deliveries,
            ..CycleReport::default()
        };

        for forecast in forecasts {
            let problem_type = forecast.problem_type;
            match self.precompute(forecast, now).await {
                Ok(problem) => {
                    debug!(
                        prediction_id = %problem.id,
                        problem_type = problem_type.as_str(),
                        probability = problem.probability,
                        approach = %problem.solution.approach,
                        "Stored prediction"
                    );
                    report.stored += 1;
                }
                Err(e) => {
                    warn!(problem_type = problem_type.as_str(), error = %e, "Prediction failed");
                    report.failed += 1;
                }
            }
        }

        report.warmed = self.warm().await;
        self.cycles.fetch_add(1, Ordering::SeqCst);
        report
    }

    fn current_weather(&self) -> WeatherCondition {
        match simulate_reading(SignalKind::Weather, self.estimator.as_ref()) {
            SignalReading::Weather { condition, .. } => condition,
            _ => WeatherCondition::Cloudy,
        }
    }

    /// Simulate the active deliveries and keep problems above the threshold,
    /// up to the per-cycle cap.
    fn forecast(&self, hour: u32, weather: WeatherCondition) -> (u32, Vec<Forecast>) {
        let estimator = self.estimator.as_ref();
        let active = estimator.range_inclusive(ACTIVE_DELIVERIES.0, ACTIVE_DELIVERIES.1);
        let weather = weather_factor(weather);
        let time = time_factor(hour);

        let mut forecasts = Vec::new();
        'deliveries: for delivery in 0..active as usize {
            let location = (
                CENTRE.0 + estimator.uniform(-LOCATION_SPREAD, LOCATION_SPREAD),
                CENTRE.1 + estimator.uniform(-LOCATION_SPREAD, LOCATION_SPREAD),
            );
            for pattern in &PATTERNS {
                if forecasts.len() >= self.config.max_predictions_per_cycle {
                    break 'deliveries;
                }
                let noise = estimator.uniform(-PROBABILITY_NOISE, PROBABILITY_NOISE);
                let p = probability(pattern.base_probability, weather, time, noise);
                if p <= self.config.probability_threshold {
                    continue;
                }
                let (lo, hi) = pattern.severity;
                let (min_units, max_units) = pattern.affected_deliveries;
                let (min_horizon, max_horizon) = pattern.horizon_minutes;
                forecasts.push(Forecast {
                    problem_type: pattern.problem_type,
                    probability: p,
                    horizon_minutes: estimator.range_inclusive(min_horizon, max_horizon),
                    affected_area: affected_area(pattern.problem_type, delivery, location),
                    affected_deliveries: estimator.range_inclusive(min_units, max_units),
                    severity: estimator.uniform(lo, hi),
                });
            }
        }

        (active, forecasts)
    }

    async fn precompute(
        &self,
        forecast: Forecast,
        now: DateTime<Utc>,
    ) -> Result<PredictedProblem, PredictorError> {
        let description = describe(
            forecast.problem_type,
            &forecast.affected_area,
            forecast.affected_deliveries,
        );
        let plan = self.orchestrator.plan(&description).await?;

        let problem = PredictedProblem {
            id: Uuid::new_v4(),
            problem_type: forecast.problem_type,
            probability: forecast.probability,
            horizon_minutes: forecast.horizon_minutes,
            affected_area: forecast.affected_area,
            affected_deliveries: forecast.affected_deliveries,
            severity: forecast.severity,
            description,
            predicted_at: now,
            solution: plan.solution,
        };

        let key = key_patterns::prediction(&problem.id.to_string());
        self.orchestrator.cache().set_with_tags(
            &key,
            &problem,
            &[PREDICTION_TAG, problem.problem_type.as_str()],
            self.config.prediction_ttl_seconds,
        )?;
        self.total_predictions.fetch_add(1, Ordering::SeqCst);
        Ok(problem)
    }

    /// Re-plan every warm scenario under its scenario key. Returns how many
    /// were stored.
    pub async fn warm(&self) -> usize {
        let mut warmed = 0;
        for text in &self.config.warm_scenarios {
            match self.warm_one(text).await {
                Ok(()) => warmed += 1,
                Err(e) => warn!(scenario = %text, error = %e, "Failed to warm scenario"),
            }
        }
        warmed
    }

    async fn warm_one(&self, text: &str) -> Result<(), PredictorError> {
        let plan = self.orchestrator.plan(text).await?;
        let key = key_patterns::scenario(&fingerprint(text));
        self.orchestrator.cache().set_with_tags(
            &key,
            &plan.solution,
            &[plan.scenario.scenario_type.as_str(), SOLUTION_TAG],
            self.orchestrator.settings().solution_ttl_seconds,
        )?;
        Ok(())
    }

    /// Live predictions, most probable first.
    pub fn predictions(&self) -> Result<Vec<PredictedProblem>, PredictorError> {
        let mut problems: Vec<PredictedProblem> = self
            .orchestrator
            .cache()
            .get_by_tag::<PredictedProblem>(PREDICTION_TAG)?
            .into_iter()
            .map(|(_, problem)| problem)
            .collect();
        problems.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        Ok(problems)
    }

    pub fn stats(&self) -> Result<PredictorStats, PredictorError> {
        let total_predictions = self.total_predictions.load(Ordering::SeqCst);
        Ok(PredictorStats {
            total_predictions,
            cached_predictions: self.orchestrator.cache().keys("prediction:*")?.len(),
            prediction_accuracy: prediction_accuracy(total_predictions),
            cycles: self.cycles.load(Ordering::SeqCst),
        })
    }
}
