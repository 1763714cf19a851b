//! Deterministic doubles for the engine's seams, shared by unit and
//! integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use synapse_cache::ResultCache;
use synapse_models::{InteractiveOption, Scenario, ScenarioType, SignalKind, SignalReading};

use crate::classifier::fingerprint;
use crate::error::EngineError;
use crate::estimator::Estimator;
use crate::orchestrator::{Orchestrator, OrchestratorSettings};
use crate::reasoning::Reasoner;
use crate::signals::{SignalHub, SignalSource};

/// Always answers the middle of the requested range.
pub struct MidpointEstimator;

impl Estimator for MidpointEstimator {
    fn uniform(&self, lo: f64, hi: f64) -> f64 {
        (lo + hi) / 2.0
    }

    fn range_inclusive(&self, lo: u32, hi: u32) -> u32 {
        if hi < lo {
            lo
        } else {
            lo + (hi - lo) / 2
        }
    }
}

pub fn scenario_of(scenario_type: ScenarioType, affected_units: u32) -> Scenario {
    let description = format!("{} scenario", scenario_type.as_str());
    Scenario {
        id: fingerprint(&description),
        description,
        created_at: Utc::now(),
        scenario_type,
        severity: 0.5,
        affected_units,
    }
}

/// Reasoner with canned answers and optional latency.
#[derive(Clone)]
pub struct StaticReasoner {
    pub explanation: String,
    pub options: Vec<InteractiveOption>,
    pub latency: Duration,
}

impl Default for StaticReasoner {
    fn default() -> Self {
        Self {
            explanation: "Reroute the affected drivers now.".to_string(),
            options: vec![
                InteractiveOption::new("Reroute", "reroute", "Send drivers around it"),
                InteractiveOption::new("Notify", "notify_customers", "Tell customers"),
            ],
            latency: Duration::ZERO,
        }
    }
}

#[async_trait]
impl Reasoner for StaticReasoner {
    fn name(&self) -> &str {
        "static"
    }

    async fn explain(&self, _scenario_text: &str, _summary: &str) -> Result<String, EngineError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.explanation.clone())
    }

    async fn suggest_options(
        &self,
        _scenario_text: &str,
        _summary: &str,
    ) -> Result<Vec<InteractiveOption>, EngineError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.options.clone())
    }
}

pub struct FailingReasoner;

#[async_trait]
impl Reasoner for FailingReasoner {
    fn name(&self) -> &str {
        "failing"
    }

    async fn explain(&self, _scenario_text: &str, _summary: &str) -> Result<String, EngineError> {
        Err(EngineError::Reasoning("reasoner offline".to_string()))
    }

    async fn suggest_options(
        &self,
        _scenario_text: &str,
        _summary: &str,
    ) -> Result<Vec<InteractiveOption>, EngineError> {
        Err(EngineError::Reasoning("reasoner offline".to_string()))
    }
}

/// Signal source returning one fixed reading and counting its probes.
pub struct StaticSignalSource {
    reading: SignalReading,
    probes: AtomicUsize,
}

impl StaticSignalSource {
    pub fn new(reading: SignalReading) -> Self {
        Self {
            reading,
            probes: AtomicUsize::new(0),
        }
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalSource for StaticSignalSource {
    fn kind(&self) -> SignalKind {
        self.reading.kind()
    }

    async fn probe(&self, _subject: &str) -> Result<SignalReading, EngineError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(self.reading.clone())
    }
}

pub struct FailingSignalSource {
    kind: SignalKind,
}

impl FailingSignalSource {
    pub fn new(kind: SignalKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl SignalSource for FailingSignalSource {
    fn kind(&self) -> SignalKind {
        self.kind
    }

    async fn probe(&self, _subject: &str) -> Result<SignalReading, EngineError> {
        Err(EngineError::Signal(format!(
            "{} feed unreachable",
            self.kind.as_str()
        )))
    }
}

/// Orchestrator over a fresh cache, no signal sources and midpoint numbers.
pub fn orchestrator_with(reasoner: Arc<dyn Reasoner>) -> Orchestrator {
    orchestrator_with_settings(reasoner, OrchestratorSettings::default())
}

pub fn orchestrator_with_settings(
    reasoner: Arc<dyn Reasoner>,
    settings: OrchestratorSettings,
) -> Orchestrator {
    Orchestrator::new(
        Arc::new(MidpointEstimator),
        SignalHub::disabled(),
        reasoner,
        Arc::new(ResultCache::new()),
        settings,
    )
}
